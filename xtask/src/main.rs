use anyhow::Result;
use clap::{Parser, Subcommand};

mod check;
mod utils;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development utility tasks for monzo-lab")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run formatting, clippy, tests and doc tests on the whole workspace
    Check {
        /// Don't check formatting
        #[arg(long)]
        skip_fmt: bool,
    },
    /// Run clippy on every workspace crate
    Clippy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { skip_fmt } => check::run_check(skip_fmt),
        Commands::Clippy => check::clippy_all_crates(),
    }
}
