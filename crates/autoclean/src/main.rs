//! CLI entry point for profiling and cleaning a CSV file.

use anyhow::{Result, anyhow};
use autoclean::{
    CleaningOutcome, CleaningPolicy, DatasetProfile, DatasetProfiler, Orchestrator,
    ReportGenerator, RunReport, Table, render_summary,
};
use clap::Parser;
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[cfg(feature = "ai")]
use autoclean::DelegatedStrategy;
#[cfg(feature = "ai")]
use autoclean::ai::OpenRouterProvider;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Configuration-free data profiling and cleaning",
    long_about = "Classifies every column of a CSV file as numeric, datetime, categorical or text,\n\
                  then removes duplicates, fills missing values, normalizes formatting and prunes\n\
                  mostly-empty rows. A 0-100 quality score is reported before and after.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  OPENROUTER_API_KEY    API key for OpenRouter (required for --ai)\n  \
                  RUST_LOG              Overrides --log-level\n\n\
                  EXAMPLES:\n  \
                  # Clean with the deterministic pipeline\n  \
                  autoclean -i data.csv\n\n  \
                  # Profile only, nothing is written\n  \
                  autoclean -i data.csv --profile-only\n\n  \
                  # Ask a language model to clean, falling back on failure\n  \
                  autoclean -i data.csv --ai -r\n\n  \
                  # Machine-readable report on stdout\n  \
                  autoclean -i data.csv --json | jq .after.quality_score"
)]
struct Args {
    /// Path to the CSV file to clean
    #[arg(short, long)]
    input: String,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Custom output file name (without extension)
    ///
    /// If not specified, uses "<input_name>_cleaned"
    #[arg(long)]
    output_name: Option<String>,

    /// Print the dataset profile and exit without cleaning
    #[arg(long)]
    profile_only: bool,

    /// Clean with a language model through OpenRouter
    ///
    /// Falls back to the deterministic pipeline when unavailable
    #[arg(long)]
    ai: bool,

    /// Output JSON to stdout instead of the human-readable summary
    ///
    /// Disables all logs; only the final JSON report is printed.
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <output_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// JSON file with policy thresholds
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Cardinality ratio below which text columns are categorical (0.0 - 1.0)
    #[arg(long)]
    categorical_ratio: Option<f64>,

    /// Exclusive maximum text length of a date value
    #[arg(long)]
    max_date_len: Option<usize>,

    /// Rows with a larger fraction of missing cells are removed (0.0 - 1.0)
    #[arg(long)]
    row_missing_threshold: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber.
///
/// With `json_output` no subscriber is installed, so stdout only carries
/// the report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let policy = build_policy(&args)?;
    debug!("Using policy: {:?}", policy);

    info!("Loading dataset from: {}", args.input);
    let table = load_csv_with_fallbacks(&args.input)?;
    info!(
        "Dataset loaded: {} rows x {} columns",
        table.row_count(),
        table.column_count()
    );

    if args.profile_only {
        let profile = DatasetProfiler::new(policy).profile(&table);
        return print_profile(&args, &profile);
    }

    if !Path::new(&args.output).exists() {
        std::fs::create_dir_all(&args.output)?;
        info!("Created output directory: {}", args.output);
    }

    let orchestrator = build_orchestrator(&args, policy);
    let outcome = orchestrator.run(&table).map_err(|e| {
        error!("Cleaning failed: {}", e);
        anyhow!("Cleaning failed: {}", e)
    })?;

    handle_output(&args, outcome)
}

/// Policy from the optional JSON file, with CLI flags taking precedence.
fn build_policy(args: &Args) -> Result<CleaningPolicy> {
    let base = match &args.policy {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| anyhow!("Could not read policy file {}: {}", path.display(), e))?;
            CleaningPolicy::from_json(&json)?
        }
        None => CleaningPolicy::default(),
    };

    let policy = CleaningPolicy::builder()
        .categorical_cardinality_ratio(
            args.categorical_ratio
                .unwrap_or(base.categorical_cardinality_ratio),
        )
        .datetime_max_text_len(args.max_date_len.unwrap_or(base.datetime_max_text_len))
        .row_missing_threshold(
            args.row_missing_threshold
                .unwrap_or(base.row_missing_threshold),
        )
        .build()?;

    Ok(policy)
}

/// Load a CSV file, retrying on a normalized copy of the text when the
/// direct read fails.
fn load_csv_with_fallbacks(path: &str) -> Result<Table> {
    match Table::read_csv(path) {
        Ok(table) => return Ok(table),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        error!("Could not read file: {}", e);
        anyhow!("Could not read {}: {}", path, e)
    })?;
    Ok(Table::from_csv_str(&normalize_csv_content(&content))?)
}

/// Strip a byte order mark, unify line endings and drop blank lines.
fn normalize_csv_content(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(feature = "ai")]
fn build_orchestrator(args: &Args, policy: CleaningPolicy) -> Orchestrator {
    let builder = Orchestrator::builder().policy(policy);
    if !args.ai {
        info!("Running the deterministic pipeline");
        return builder.build();
    }

    match OpenRouterProvider::from_env() {
        Ok(provider) => {
            info!("Running delegated cleaning (OpenRouter)");
            builder.strategy(DelegatedStrategy::new(provider)).build()
        }
        Err(e) => {
            warn!("{}. Falling back to the deterministic pipeline.", e);
            builder.build()
        }
    }
}

#[cfg(not(feature = "ai"))]
fn build_orchestrator(args: &Args, policy: CleaningPolicy) -> Orchestrator {
    if args.ai {
        warn!("AI support not compiled in. Using the deterministic pipeline.");
        warn!("Compile with --features ai to enable AI support.");
    }
    info!("Running the deterministic pipeline");
    Orchestrator::builder().policy(policy).build()
}

/// Write the cleaned CSV and emit the report as requested.
///
/// - Default: human-readable summary on stdout
/// - `--json`: JSON report on stdout only
/// - `--emit-report`: JSON report written next to the CSV
fn handle_output(args: &Args, outcome: CleaningOutcome) -> Result<()> {
    let generator = ReportGenerator::new(PathBuf::from(&args.output), output_name(args));

    let csv_path = generator.write_cleaned_data(&outcome.table)?;
    info!("Cleaned data written to: {}", csv_path.display());

    let report = RunReport::new(&args.input, Some(&csv_path), outcome.report);

    if args.emit_report {
        let report_path = generator.write_report(&report)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", render_summary(&report.cleaning));
    println!("Output: {}", csv_path.display());
    Ok(())
}

/// Print the dataset profile.
///
/// Uses `println!` on purpose: the profile is the command's output and must
/// show regardless of log level.
fn print_profile(args: &Args, profile: &DatasetProfile) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DATASET PROFILE");
    println!("{}\n", "=".repeat(80));

    println!("  File: {}", args.input);
    println!("  Rows: {}", profile.row_count);
    println!("  Columns: {}", profile.column_count);
    println!(
        "  Duplicate rows: {} ({:.1}%)",
        profile.duplicate_rows, profile.duplicate_percentage
    );
    println!("  Quality score: {:.2}", profile.quality_score);
    println!();

    println!(
        "{:<20} {:<12} {:<10} {:<10} {:<24}",
        "Column", "Kind", "Missing %", "Distinct", "Summary"
    );
    println!("{}", "-".repeat(80));

    for col in &profile.columns {
        let summary = match (&col.numeric, col.top_values.first()) {
            (Some(n), _) => format!("mean {:.2}, median {:.2}", n.mean, n.median),
            (None, Some(top)) => format!("top '{}' ({})", truncate_str(&top.value, 12), top.count),
            (None, None) => String::new(),
        };
        println!(
            "{:<20} {:<12} {:<10.1} {:<10} {:<24}",
            truncate_str(&col.name, 19),
            col.kind.display_name(),
            col.absent_percentage,
            col.distinct_count,
            summary
        );
    }

    println!("\n{}", "=".repeat(80));
    println!("Run without --profile-only to clean the dataset");
    println!("{}", "=".repeat(80));

    Ok(())
}

fn output_name(args: &Args) -> String {
    args.output_name
        .clone()
        .unwrap_or_else(|| format!("{}_cleaned", extract_file_stem(&args.input)))
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Truncate a string to at most `max_len` characters with an ellipsis.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
