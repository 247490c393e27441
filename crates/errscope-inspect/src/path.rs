//! Step-by-step evaluation of an ordered conjunctive rule.
//!
//! The evaluator walks the conditions left to right. Each step narrows the
//! population left by the previous one (starting from every row) and emits a
//! [`PathNode`] with the matched count and error rate; the node of the next
//! step is its only child, so the result is a chain.
//!
//! Bad input never aborts an evaluation:
//!
//! - A condition naming a column (or, for a concept, only tokens) that is not
//!   loaded produces a node with size `0` and ends the chain there. The final
//!   population is then empty.
//! - A condition that cannot be parsed (unknown sign, missing or ill-typed
//!   value) produces a node carrying a diagnostic. It does not narrow the
//!   population, and the chain continues.

use errscope_data::{ColumnTable, Condition, ConditionSpec};
use serde::{Deserialize, Serialize};

use crate::{
    data::InspectionData,
    hints::{self, Hint, HintConfig},
    population::Population,
};

/// Knobs of a [`RuleEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Attach each matched row's top-token annotation to the result.
    pub include_top_tokens: bool,
    pub hints_enabled: bool,
    /// A hint must match strictly more rows than this.
    pub hint_min_support: usize,
    pub max_hints: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            include_top_tokens: true,
            hints_enabled: true,
            hint_min_support: 20,
            max_hints: 2,
        }
    }
}

impl EvaluatorConfig {
    fn hint_config(&self) -> HintConfig {
        HintConfig {
            min_support: self.hint_min_support,
            max_hints: self.max_hints,
        }
    }
}

/// Statistics after one step of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    #[serde(flatten)]
    pub condition: ConditionSpec,
    /// Rows matched by the rule up to and including this step.
    pub size: usize,
    pub error_rate: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PathNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl PathNode {
    /// The nodes of the chain, from this one down.
    pub fn iter(&self) -> impl Iterator<Item = &PathNode> {
        std::iter::successors(Some(self), |node| node.children.first())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionResult {
    /// Row ids matched by the whole rule (errors only, when requested).
    pub doc_list: Vec<usize>,
    /// Root of the statistics chain; `None` for an empty rule.
    pub path_info: Option<PathNode>,
    /// Error rate of the rows matched by the whole rule.
    pub final_error_rate: f64,
    /// Top-token annotation of each row in `doc_list`, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_token_list: Option<Vec<Option<serde_json::Value>>>,
    pub hints: Vec<Hint>,
}

/// Outcome of one step.
enum Step {
    /// The condition was applied.
    Narrowed(Population),
    /// The condition refers to nothing that is loaded.
    Unresolved,
    /// The condition could not be parsed; the population passes through.
    Malformed(String),
}

/// Evaluates rules against one [`InspectionData`].
///
/// The evaluator holds no per-request state; every call to
/// [`RuleEvaluator::evaluate`] starts over from the full population.
#[derive(Debug, Clone, Copy)]
pub struct RuleEvaluator<'a> {
    data: &'a InspectionData,
    config: EvaluatorConfig,
}

impl<'a> RuleEvaluator<'a> {
    #[must_use]
    pub fn new(data: &'a InspectionData, config: EvaluatorConfig) -> Self {
        Self { data, config }
    }

    #[must_use]
    pub fn evaluate(&self, rule: &[ConditionSpec], error_only: bool) -> InspectionResult {
        let is_error = self.data.is_error();
        let mut population = Population::full(self.data.num_rows());
        let mut nodes = Vec::with_capacity(rule.len());

        for spec in rule {
            let step = self.apply(spec, &population);
            let mut node = PathNode {
                condition: spec.clone(),
                size: 0,
                error_rate: 0.0,
                children: vec![],
                diagnostic: None,
            };
            match step {
                Step::Narrowed(narrowed) => population = narrowed,
                Step::Unresolved => {
                    tracing::debug!(
                        feature = %spec.feature,
                        "condition refers to an unknown column"
                    );
                    population = Population::empty();
                    nodes.push(node);
                    break;
                }
                Step::Malformed(diagnostic) => {
                    tracing::warn!(%diagnostic, "skipping malformed condition");
                    node.diagnostic = Some(diagnostic);
                }
            }
            node.size = population.len();
            node.error_rate = population.error_rate(is_error);
            nodes.push(node);
        }

        let final_error_rate = population.error_rate(is_error);
        let hints = if self.config.hints_enabled {
            self.data.tokens().map_or_else(Vec::new, |tokens| {
                hints::generate_hints(
                    tokens,
                    self.data.good_idx(),
                    is_error,
                    &population,
                    final_error_rate,
                    &self.config.hint_config(),
                )
            })
        } else {
            vec![]
        };

        let matched = if error_only {
            population.narrow(|row| is_error[row] != 0)
        } else {
            population
        };
        let top_token_list = self.config.include_top_tokens.then(|| {
            matched
                .rows()
                .iter()
                .map(|&row| self.data.top_tokens().get(row).cloned())
                .collect()
        });

        tracing::debug!(
            steps = nodes.len(),
            matched = matched.len(),
            final_error_rate,
            "evaluated rule"
        );
        InspectionResult {
            doc_list: matched.rows().to_vec(),
            path_info: chain(nodes),
            final_error_rate,
            top_token_list,
            hints,
        }
    }

    fn apply(&self, spec: &ConditionSpec, population: &Population) -> Step {
        let condition = match Condition::try_from(spec) {
            Ok(condition) => condition,
            Err(err) => return Step::Malformed(err.to_string()),
        };
        let columns = self.data.columns();
        match &condition {
            Condition::TokenPresent { token: name }
            | Condition::CategoricalEquals { feature: name, .. } => {
                let Some(column) = columns.column(name) else {
                    return Step::Unresolved;
                };
                Step::Narrowed(population.narrow(|row| condition.matches_value(column[row])))
            }
            Condition::ConceptMembership { tokens, .. } => {
                let members = known_columns(columns, tokens);
                if members.is_empty() {
                    return Step::Unresolved;
                }
                Step::Narrowed(population.narrow(|row| any_member_set(&members, row)))
            }
        }
    }
}

/// Columns of the tokens that exist in `table`, in the given order.
pub(crate) fn known_columns<'t>(table: &'t ColumnTable, tokens: &[String]) -> Vec<&'t [f64]> {
    tokens.iter().filter_map(|token| table.column(token)).collect()
}

/// Concept membership: any member column equals `1`.
#[expect(clippy::float_cmp)]
pub(crate) fn any_member_set(members: &[&[f64]], row: usize) -> bool {
    members.iter().any(|column| column[row] == 1.0)
}

/// Nests a flat list of step nodes into a chain.
fn chain(nodes: Vec<PathNode>) -> Option<PathNode> {
    nodes.into_iter().rev().fold(None, |child, mut node| {
        node.children.extend(child);
        Some(node)
    })
}
