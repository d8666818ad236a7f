//! crossfs CLI - copy directory trees between filesystem instances

use clap::Parser;
use crossfs::config::{CliArgs, CopyConfig, LogFormat, OutputFormat};
use crossfs::core::{copy_host_paths, CopySummary, TreeCopyEngine};
use crossfs::error::{CrossFsError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_logging(&args);

    // Handle result
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &CliArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match args.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(args: &CliArgs) -> Result<()> {
    // Build configuration
    let config = CopyConfig::from_cli(args)
        .and_then(|config| config.resolve_host_paths())
        .map_err(CrossFsError::Config)?;

    if args.verbose > 0 {
        print_config(&config);
    }

    let summary = copy_host_paths(&TreeCopyEngine::new(), &config)?;

    // Print results
    if !config.quiet {
        print_summary(&summary, config.output_format)?;
    }

    Ok(())
}

fn print_config(config: &CopyConfig) {
    eprintln!("=== Configuration ===");
    eprintln!("Mode:        {:?}", config.mode);
    for source in &config.sources {
        eprintln!("Source:      {}", source.display());
    }
    eprintln!("Destination: {}", config.destination.display());
    eprintln!();
}

fn print_summary(summary: &CopySummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => summary.print_summary(),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(summary)
                .map_err(|e| CrossFsError::io("copy summary", e.into()))?;
            println!("{}", json);
        }
    }
    Ok(())
}
