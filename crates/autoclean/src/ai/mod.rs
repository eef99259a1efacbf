//! Text-generation providers used by the delegated cleaning strategy.
//!
//! # Feature Flag
//!
//! The [`TextGenerationProvider`] trait is always available so callers can
//! plug in their own backend. The bundled OpenRouter client needs the `ai`
//! feature (enabled by default).
//!
//! ```toml
//! # Without the HTTP client
//! autoclean = { version = "0.1", default-features = false }
//! ```

mod provider;
pub use provider::TextGenerationProvider;

#[cfg(feature = "ai")]
mod openrouter;

#[cfg(feature = "ai")]
pub use openrouter::{OpenRouterConfig, OpenRouterConfigBuilder, OpenRouterProvider, API_KEY_ENV};
