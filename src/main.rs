//! texdock CLI - containerized LaTeX document builder
//!
//! Entry point for the texdock command-line application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use texdock::cli::output::display_error;
use texdock::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = cli.output_config();

    // RUST_LOG directives take precedence over the -v default
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(output.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Run the command and handle errors
    match cli.run(&output).await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e, &output);
            std::process::exit(1);
        }
    }
}
