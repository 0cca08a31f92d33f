//! ba-insight - AI-powered business-area clustering
//!
//! A CLI tool that aggregates a transaction CSV by business area and
//! uses the Gemini API with a structured output schema to cluster the
//! areas into segments and write an executive report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (parse, analysis, config, I/O)

mod analysis;
mod analyst;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod report;

use analyst::client::ClientConfig;
use analyst::GeminiClient;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{InsightReport, ReportMetadata};
use pipeline::Pipeline;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ba-insight v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the pipeline
    if let Err(e) = run(args).await {
        error!("Run failed: {}", e);
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .ba-insight.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".ba-insight.toml");

    if path.exists() {
        eprintln!("⚠️  .ba-insight.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .ba-insight.toml")?;

    println!("✅ Created .ba-insight.toml with default settings.");
    println!("   Edit it to customize model, language, timeout, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Create a phase spinner, or a hidden one in quiet mode.
fn phase_spinner(quiet: bool, message: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static spinner template"),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Run the complete aggregate-analyze-report workflow.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // input is validated present when we get here
    let input = args
        .input
        .clone()
        .context("No input file provided")?;

    // Step 1: Read and aggregate the CSV
    let spinner = phase_spinner(args.quiet, "Processing CSV data...");
    let raw_text = pipeline::read_input(&input).await?;

    let mut pipeline = Pipeline::new(
        config.analysis.language.clone(),
        config.model.temperature,
    );
    pipeline.submit(&raw_text)?;
    spinner.finish_and_clear();

    if !args.quiet {
        println!(
            "📊 Aggregated {} business areas from {}",
            pipeline.data().len(),
            input.display()
        );
    }
    if pipeline.data().is_empty() {
        warn!("No distinct business areas found; every data row was malformed");
    }

    // Step 2: AI analysis (skipped in dry-run mode)
    if !args.dry_run {
        let api_key = args
            .api_key
            .clone()
            .context("API key not set")?;

        let client = GeminiClient::new(ClientConfig {
            api_base: config.model.api_base.clone(),
            api_key,
            model: config.model.name.clone(),
            timeout_seconds: config.model.timeout_seconds,
        })?;

        if !args.quiet {
            println!("🤖 Consulting {} for clustering...", config.model.name);
        }
        let spinner = phase_spinner(args.quiet, "Identifying clusters and strategic insights...");
        pipeline.run_analysis(&client).await?;
        spinner.finish_and_clear();
    } else {
        info!("Dry run: skipping AI analysis");
    }

    // Step 3: Build and write the report
    let metadata = ReportMetadata {
        input_file: input.display().to_string(),
        analysis_date: Utc::now(),
        model_used: config.model.name.clone(),
        business_areas: pipeline.data().len(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let insight_report = InsightReport {
        metadata,
        data: pipeline.data().to_vec(),
        analysis: pipeline.analysis().cloned(),
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&insight_report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&insight_report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    // Print summary
    if !args.quiet {
        if let Some(analysis) = insight_report.analysis.as_ref() {
            println!("\n📈 Analysis Summary:");
            println!("   Segments: {}", analysis.clusters.len());
            for cluster in &analysis.clusters {
                println!(
                    "   - {} ({} BAs)",
                    cluster.name,
                    cluster.member_bas.len()
                );
            }
        }
        println!(
            "   Duration: {:.1}s",
            insight_report.metadata.duration_seconds
        );
        println!(
            "\n✅ Done! Report saved to: {}",
            args.output.display()
        );
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .ba-insight.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
