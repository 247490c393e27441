use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use errscope_data::SplitConfig;
use errscope_discovery::{
    session::{DebugSession, SearchMode, SessionConfig},
    subgroup::FilterThreshold,
};
use errscope_stats::bootstrap::BootstrapConfig;

use crate::{
    schema::search_report::SearchReport,
    util::{self, Output},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ModeArg {
    /// Binary token columns filtered by importance
    Token,
    /// Continuous columns cut into percentile bins
    HighLevel,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Token => SearchMode::Token,
            ModeArg::HighLevel => SearchMode::HighLevel,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SearchRulesArg {
    /// Dataset JSON file (`matrix` with the outcome column last, `is_error`)
    dataset: PathBuf,
    /// Importance JSON file, one score per column (required in token mode)
    #[arg(long)]
    importances: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ModeArg::Token)]
    mode: ModeArg,
    /// A rule is kept only if its error rate is above this
    #[arg(long, default_value_t = 0.3)]
    min_err_rate: f64,
    /// A rule is kept only if it matches more rows than this
    #[arg(long, default_value_t = 20)]
    min_support: usize,
    /// Baseline error rate of the significance test
    #[arg(long, default_value_t = 0.3)]
    model_err_rate: f64,
    /// Fraction of rows held out
    #[arg(long, default_value_t = 0.1)]
    test_fraction: f64,
    /// Seed of the train / held-out split
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Attach bootstrap confidence intervals to every rule
    #[arg(long)]
    with_ci: bool,
    #[arg(long, default_value_t = 9999)]
    resamples: usize,
    /// Seed of the bootstrap; fresh entropy when omitted
    #[arg(long)]
    bootstrap_seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SearchRulesArg) -> anyhow::Result<()> {
    let dataset = util::read_dataset_file(&arg.dataset)?;
    let mode = SearchMode::from(arg.mode);
    let importances = match (&arg.importances, mode) {
        (Some(path), _) => util::read_importance_file(path)?,
        (None, SearchMode::Token) => anyhow::bail!("--importances is required in token mode"),
        (None, SearchMode::HighLevel) => vec![],
    };

    let threshold = FilterThreshold {
        err_rate: arg.min_err_rate,
        support: arg.min_support,
    };
    let config = SessionConfig {
        model_err_rate: arg.model_err_rate,
        split: SplitConfig {
            test_fraction: arg.test_fraction,
            seed: arg.seed,
        },
        bootstrap: BootstrapConfig {
            resamples: arg.resamples,
            seed: arg.bootstrap_seed,
            ..BootstrapConfig::default()
        },
        ..SessionConfig::new(mode, threshold)
    };

    let session = DebugSession::new(dataset, &importances, config)
        .context("Failed to prepare the search")?;
    tracing::info!(features = session.num_features(), ?mode, "searching rules");
    let mut outcome = session.search();
    tracing::info!(rules = outcome.rules.len(), "search finished");

    if arg.with_ci {
        tracing::info!(rules = outcome.rules.len(), "computing confidence intervals");
        session.attach_confidence_intervals(&mut outcome.rules);
    }

    let report = SearchReport {
        generated_at: Utc::now(),
        mode,
        threshold,
        model_err_rate: arg.model_err_rate,
        num_features: session.num_features(),
        rules: outcome.rules,
        top_features: outcome.top_features,
    };
    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}
