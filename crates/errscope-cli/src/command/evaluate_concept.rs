use std::path::PathBuf;

use errscope_inspect::concept::ConceptEvaluator;
use errscope_stats::bootstrap::BootstrapConfig;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateConceptArg {
    /// Inspection data JSON file
    data: PathBuf,
    /// Member tokens of the concept
    #[arg(long, value_delimiter = ',', required = true)]
    tokens: Vec<String>,
    #[arg(long, default_value_t = 9999)]
    resamples: usize,
    /// Seed of the bootstrap; fresh entropy when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateConceptArg) -> anyhow::Result<()> {
    let data = util::read_inspection_data_file(&arg.data)?;
    let config = BootstrapConfig {
        resamples: arg.resamples,
        seed: arg.seed,
        ..BootstrapConfig::default()
    };
    let stat = ConceptEvaluator::new(&data, config).evaluate(&arg.tokens);
    tracing::info!(
        tokens = arg.tokens.len(),
        support = stat.support,
        err_rate = stat.err_rate,
        "evaluated concept"
    );
    Output::save_json(&stat, arg.output.clone())?;
    Ok(())
}
