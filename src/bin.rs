//! Binary entry point for `motivation-bot`.
//!
//! This module provides the command-line interface for motivation-bot with options
//! for configuration file paths and logging verbosity. It initializes logging,
//! loads the configuration, performs one run, and exits with its status.

use std::{io::IsTerminal, process::ExitCode};

use clap::Parser;
use motivation_bot::base::{
    config::Config,
    types::{Res, Void},
};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Motivation-bot – posts a generated cycling poem to Discord.
///
/// Configuration comes from environment variables (`DISCORD_BOT_TOKEN`,
/// `DISCORD_CHANNEL_ID`, `RUN_PROJECT_ID`, `RUN_REGION`), optionally layered
/// over a TOML config file.  Meant to be run once per invocation by a scheduler.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the bot will look for a config file at `.hidden/config.toml`
    /// in the current directory.  Environment variables take precedence.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Also export spans over OTLP/HTTP (honors the standard `OTEL_EXPORTER_OTLP_*` variables).
    #[arg(long)]
    otlp: bool,
}

/// Main entry point for the motivation-bot binary.
///
/// Sets up logging based on verbosity, loads configuration, and runs the job once.
///
/// Logging (and the otlp exporter, whose HTTP client blocks) is set up and torn
/// down outside the tokio runtime; only the run itself is driven by it.
fn main() -> ExitCode {
    let args = Args::parse();

    let provider = match init_tracing(&args) {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("error initializing logging: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(run(&args)));

    let status = motivation_bot::report(&result);

    if let Some(provider) = provider
        && let Err(err) = provider.shutdown()
    {
        eprintln!("error shutting down the otlp exporter: {}", err);
    }

    ExitCode::from(status)
}

/// Load the configuration and perform the run.
async fn run(args: &Args) -> Void {
    let config = Config::load(args.config.as_deref())?;

    motivation_bot::start(config).await
}

/// Install the stdout layer, plus the otlp layer when requested.
fn init_tracing(args: &Args) -> Res<Option<SdkTracerProvider>> {
    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(std::io::stdout().is_terminal())
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer.

    let (otel, provider) = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let provider = SdkTracerProvider::builder().with_batch_exporter(exporter).build();
        let otel = tracing_opentelemetry::layer().with_tracer(provider.tracer("motivation-bot"));

        (Some(otel.boxed()), Some(provider))
    } else {
        (None, None)
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    Ok(provider)
}
