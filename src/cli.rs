//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ba-insight - Business-area clustering for transaction CSVs
///
/// Aggregate a transaction CSV by business area and let an LLM group
/// the areas into segments with an executive narrative.
///
/// Examples:
///   ba-insight --input transactions.csv
///   ba-insight --input transactions.csv --format json
///   ba-insight --input transactions.csv --dry-run
///   ba-insight --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the transaction CSV file
    ///
    /// The file needs a 'BA' or 'Business Area' column; an amount
    /// column ('Amount', 'DMBTR', 'Value', 'Net ...') is optional.
    /// Not required when using --init-config.
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Gemini model to use for the analysis
    #[arg(short, long, default_value = "gemini-2.5-flash", env = "BA_INSIGHT_MODEL")]
    pub model: String,

    /// Gemini API key
    ///
    /// Required unless --dry-run. Checked before any request is sent.
    #[arg(long, env = "GEMINI_API_KEY", value_name = "KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output file path for the report
    #[arg(short, long, default_value = "ba_insight_report.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Natural language for the analysis narrative
    #[arg(long, default_value = "Thai", value_name = "LANGUAGE")]
    pub language: String,

    /// Temperature for the analysis call (0.0 - 1.0)
    ///
    /// Lower values produce more consistent analytical output
    #[arg(long, default_value = "0.3")]
    pub temperature: f32,

    /// Request timeout in seconds
    ///
    /// How long to wait for the analysis to respond. Default: from
    /// config or 120s. A hang blocks the whole run; there are no
    /// retries.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ba-insight.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: aggregate the CSV without calling the LLM
    ///
    /// Writes a report with the aggregate table only.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .ba-insight.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // API key is a fatal precondition unless no request will be sent
        if !self.dry_run && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(
                "API key not set. Use --api-key or the GEMINI_API_KEY environment variable"
                    .to_string(),
            );
        }

        // Validate input file if provided
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
