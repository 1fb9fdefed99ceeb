//! Argument parsing and dispatch
//!
//! Commands translate flags into [`crate::core`] calls and render the
//! results; the build logic itself lives in `core`.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::Parser;

use commands::Commands;
use output::OutputConfig;

/// texdock - containerized LaTeX document builder
///
/// Build language variants of a LaTeX document inside container images and
/// check the compiler log for errors and warnings.
#[derive(Parser, Debug)]
#[command(name = "texdock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// More output: -v shows stage progress and runtime stderr, -vv adds debug logs
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output settings requested on the command line
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::new(self.quiet, self.json, self.verbose)
    }

    /// Run the selected subcommand, or print help when there is none
    pub async fn run(self, output: &OutputConfig) -> Result<()> {
        use clap::CommandFactory;

        match self.command {
            Some(command) => command.run(output).await,
            None => Ok(Self::command().print_help()?),
        }
    }
}
