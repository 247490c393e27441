use clap::{Parser, Subcommand};

use self::{
    evaluate_concept::EvaluateConceptArg, inspect_rule::InspectRuleArg,
    search_rules::SearchRulesArg,
};

mod evaluate_concept;
mod inspect_rule;
mod search_rules;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Search single and pairwise rules with elevated error rate
    SearchRules(#[clap(flatten)] SearchRulesArg),
    /// Evaluate a rule step by step and suggest refinements
    InspectRule(#[clap(flatten)] InspectRuleArg),
    /// Compute support, error rate and confidence interval of a token concept
    EvaluateConcept(#[clap(flatten)] EvaluateConceptArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::SearchRules(arg) => search_rules::run(&arg)?,
        Mode::InspectRule(arg) => inspect_rule::run(&arg)?,
        Mode::EvaluateConcept(arg) => evaluate_concept::run(&arg)?,
    }
    Ok(())
}
