use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
use commands::{analyze::AnalyzeArgs, rules::RulesArgs};

#[derive(Parser)]
#[command(name = "pagecheck")]
#[command(about = "Web-page performance audit engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the audit rules over a captured page and print the report
    Analyze(AnalyzeArgs),

    /// List the available rules and what input they need
    Rules(RulesArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args),
        Commands::Rules(args) => commands::rules::execute(args),
    }
}
