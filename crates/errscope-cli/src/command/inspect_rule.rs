use std::path::PathBuf;

use errscope_inspect::{
    group_stats::group_stats,
    path::{EvaluatorConfig, RuleEvaluator},
    train_stats::token_stats_in_train,
};

use crate::{
    schema::inspection_report::InspectionReport,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectRuleArg {
    /// Inspection data JSON file
    data: PathBuf,
    /// Rule JSON file: an array of `{"feature", "sign", "val"}` conditions
    rule: PathBuf,
    /// List only the matched rows that are errors
    #[arg(long)]
    error_only: bool,
    /// Document attributes or high-level features to group the matched rows by
    /// (default: every high-level feature)
    #[arg(long, value_delimiter = ',')]
    keys: Vec<String>,
    /// Omit the per-row top-token annotations
    #[arg(long)]
    no_top_tokens: bool,
    /// Do not suggest refinements
    #[arg(long)]
    no_hints: bool,
    /// A hint must match more rows than this
    #[arg(long, default_value_t = 20)]
    hint_min_support: usize,
    #[arg(long, default_value_t = 2)]
    max_hints: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &InspectRuleArg) -> anyhow::Result<()> {
    let data = util::read_inspection_data_file(&arg.data)?;
    let rule = util::read_rule_file(&arg.rule)?;

    let config = EvaluatorConfig {
        include_top_tokens: !arg.no_top_tokens,
        hints_enabled: !arg.no_hints,
        hint_min_support: arg.hint_min_support,
        max_hints: arg.max_hints,
    };
    let result = RuleEvaluator::new(&data, config).evaluate(&rule, arg.error_only);
    tracing::info!(
        conditions = rule.len(),
        matched = result.doc_list.len(),
        final_error_rate = result.final_error_rate,
        hints = result.hints.len(),
        "inspected rule"
    );

    let report = InspectionReport {
        group_stats: group_stats(&data, &result.doc_list, &arg.keys),
        train_stats: token_stats_in_train(data.train_token_stats(), &rule),
        result,
    };
    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}
