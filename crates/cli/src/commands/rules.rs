use anyhow::Result;
use clap::Args;
use colored::*;

use pagecheck_rules::rules::builtin_rules;

#[derive(Args)]
pub struct RulesArgs {
    /// Include documentation URLs
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn execute(args: RulesArgs) -> Result<()> {
    let rules = builtin_rules();
    println!("{} built-in rules:\n", rules.len());
    for rule in &rules {
        let marker = if rule.is_experimental() {
            " (experimental)".bright_yellow().to_string()
        } else {
            String::new()
        };
        println!("{}{}", rule.name().bright_cyan().bold(), marker);
        let required = rule.required_capabilities();
        if required.is_empty() {
            println!("  requires: nothing beyond captured resources");
        } else {
            println!("  requires: {:?}", required);
        }
        if args.verbose {
            println!("  docs: {}", rule.documentation_url());
        }
        println!();
    }
    Ok(())
}
