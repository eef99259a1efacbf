//! Provider trait for abstracting LLM interactions.
//!
//! # Implementing a New Provider
//!
//! 1. Create a new file in `src/ai/`
//! 2. Implement [`TextGenerationProvider`] for your client
//! 3. Export it from `src/ai/mod.rs`
//!
//! ```rust,ignore
//! struct Canned(String);
//!
//! impl TextGenerationProvider for Canned {
//!     fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
//!         Ok(self.0.clone())
//!     }
//!     fn name(&self) -> &str {
//!         "Canned"
//!     }
//! }
//! ```

use anyhow::Result;

/// A backend that turns a prompt into a text completion.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so strategies holding them can be
/// shared across threads.
///
/// # Error Handling
///
/// Any failure (network, authentication, empty answer) is returned as an
/// error; the delegated strategy turns it into
/// [`CleaningError::StrategyUnavailable`](crate::error::CleaningError::StrategyUnavailable).
pub trait TextGenerationProvider: Send + Sync {
    /// Send a prompt and return the model's answer.
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Model used by this provider, if it exposes one.
    fn model(&self) -> Option<&str> {
        None
    }
}

impl<P: TextGenerationProvider + ?Sized> TextGenerationProvider for Box<P> {
    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> Option<&str> {
        (**self).model()
    }
}

impl<P: TextGenerationProvider + ?Sized> TextGenerationProvider for std::sync::Arc<P> {
    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> Option<&str> {
        (**self).model()
    }
}
