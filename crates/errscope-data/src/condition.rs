//! Rule conditions.
//!
//! A condition exists in two forms:
//!
//! - [`ConditionSpec`]: the wire form exchanged with the serving layer,
//!   `{"feature": .., "sign": .., "val": ..}`. The sign selects the kind:
//!   `">"` (token present), `"="` (categorical equals) or `"is"` (concept
//!   membership). Specs come from users and may be malformed.
//! - [`Condition`]: the validated, typed form the engines evaluate.
//!
//! ```json
//! [
//!   {"feature": "refund", "sign": ">"},
//!   {"feature": "length", "sign": "=", "val": 2},
//!   {"feature": "delivery", "sign": "is", "val": ["late", "delayed", "lost"]}
//! ]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SIGN_TOKEN_PRESENT: &str = ">";
pub const SIGN_CATEGORICAL_EQUALS: &str = "=";
pub const SIGN_CONCEPT_MEMBERSHIP: &str = "is";

/// Value above which a binary token column counts as present.
pub const TOKEN_PRESENCE_THRESHOLD: f64 = 0.5;

/// Wire form of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Token, feature or concept name.
    #[serde(default)]
    pub feature: String,
    /// Empty when absent; rejected as an unknown sign on validation.
    #[serde(default)]
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<ConditionValue>,
}

/// Payload of a condition: a bin value or a concept's member tokens.
///
/// Any other JSON value is kept as [`ConditionValue::Other`] so one ill-typed
/// condition does not reject the whole rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Tokens(Vec<String>),
    Other(Value),
}

/// A validated condition.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum Condition {
    /// Row matches when the token column's value is above
    /// [`TOKEN_PRESENCE_THRESHOLD`].
    TokenPresent { token: String },
    /// Row matches when the discretized feature equals `bin`.
    CategoricalEquals { feature: String, bin: f64 },
    /// Row matches when any member token column equals `1`.
    ConceptMembership { concept: String, tokens: Vec<String> },
}

/// A condition spec that cannot be turned into a [`Condition`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConditionError {
    #[display("unrecognized condition sign '{sign}' on '{feature}'")]
    UnknownSign { feature: String, sign: String },
    #[display("condition '{feature} {sign}' needs a value")]
    MissingValue { feature: String, sign: String },
    #[display("condition '{feature} {sign}' has a value of the wrong type")]
    InvalidValue { feature: String, sign: String },
}

impl Condition {
    /// The token, feature or concept name this condition is about.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Condition::TokenPresent { token } => token,
            Condition::CategoricalEquals { feature, .. } => feature,
            Condition::ConceptMembership { concept, .. } => concept,
        }
    }

    /// Whether a single cell value satisfies a token or categorical condition.
    ///
    /// Concept membership spans several columns and is not decided per cell;
    /// it returns `false` here.
    #[must_use]
    pub fn matches_value(&self, value: f64) -> bool {
        match self {
            Condition::TokenPresent { .. } => is_token_present(value),
            #[expect(clippy::float_cmp)]
            Condition::CategoricalEquals { bin, .. } => value == *bin,
            Condition::ConceptMembership { .. } => false,
        }
    }
}

/// Binary token semantics shared by every engine.
#[must_use]
pub fn is_token_present(value: f64) -> bool {
    value > TOKEN_PRESENCE_THRESHOLD
}

impl TryFrom<&ConditionSpec> for Condition {
    type Error = ConditionError;

    fn try_from(spec: &ConditionSpec) -> Result<Self, Self::Error> {
        let feature = spec.feature.clone();
        let sign = spec.sign.clone();
        match spec.sign.as_str() {
            SIGN_TOKEN_PRESENT => Ok(Condition::TokenPresent { token: feature }),
            SIGN_CATEGORICAL_EQUALS => match &spec.val {
                Some(ConditionValue::Number(bin)) => Ok(Condition::CategoricalEquals {
                    feature,
                    bin: *bin,
                }),
                Some(ConditionValue::Tokens(_) | ConditionValue::Other(_)) => {
                    Err(ConditionError::InvalidValue { feature, sign })
                }
                None => Err(ConditionError::MissingValue { feature, sign }),
            },
            SIGN_CONCEPT_MEMBERSHIP => match &spec.val {
                Some(ConditionValue::Tokens(tokens)) => Ok(Condition::ConceptMembership {
                    concept: feature,
                    tokens: tokens.clone(),
                }),
                Some(ConditionValue::Number(_) | ConditionValue::Other(_)) => {
                    Err(ConditionError::InvalidValue { feature, sign })
                }
                None => Err(ConditionError::MissingValue { feature, sign }),
            },
            _ => Err(ConditionError::UnknownSign { feature, sign }),
        }
    }
}

impl From<&Condition> for ConditionSpec {
    fn from(condition: &Condition) -> Self {
        match condition {
            Condition::TokenPresent { token } => Self {
                feature: token.clone(),
                sign: SIGN_TOKEN_PRESENT.to_owned(),
                val: None,
            },
            Condition::CategoricalEquals { feature, bin } => Self {
                feature: feature.clone(),
                sign: SIGN_CATEGORICAL_EQUALS.to_owned(),
                val: Some(ConditionValue::Number(*bin)),
            },
            Condition::ConceptMembership { concept, tokens } => Self {
                feature: concept.clone(),
                sign: SIGN_CONCEPT_MEMBERSHIP.to_owned(),
                val: Some(ConditionValue::Tokens(tokens.clone())),
            },
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::TokenPresent { token } => write!(f, "{token} > {TOKEN_PRESENCE_THRESHOLD}"),
            Condition::CategoricalEquals { feature, bin } => write!(f, "{feature} = {bin}"),
            Condition::ConceptMembership { concept, tokens } => {
                write!(f, "{concept} is [{}]", tokens.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Condition, ConditionError> {
        let spec: ConditionSpec = serde_json::from_str(json).unwrap();
        Condition::try_from(&spec)
    }

    #[test]
    fn test_parse_each_kind() {
        assert_eq!(
            parse(r#"{"feature": "refund", "sign": ">"}"#).unwrap(),
            Condition::TokenPresent {
                token: "refund".into()
            }
        );
        assert_eq!(
            parse(r#"{"feature": "length", "sign": "=", "val": 2}"#).unwrap(),
            Condition::CategoricalEquals {
                feature: "length".into(),
                bin: 2.0
            }
        );
        let concept = parse(r#"{"feature": "late", "sign": "is", "val": ["late", "delay"]}"#)
            .unwrap();
        assert!(concept.is_concept_membership());
        assert_eq!(concept.name(), "late");
    }

    #[test]
    fn test_token_spec_ignores_extra_fields() {
        let condition = parse(r#"{"feature": "a", "sign": ">", "threshold": 0.5}"#).unwrap();
        assert!(condition.is_token_present());
    }

    #[test]
    fn test_malformed_specs() {
        assert!(matches!(
            parse(r#"{"feature": "a", "sign": "<"}"#),
            Err(ConditionError::UnknownSign { .. })
        ));
        assert!(matches!(
            parse(r#"{"feature": "a", "sign": "="}"#),
            Err(ConditionError::MissingValue { .. })
        ));
        assert!(matches!(
            parse(r#"{"feature": "a", "sign": "is", "val": 3}"#),
            Err(ConditionError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse(r#"{"feature": "a"}"#),
            Err(ConditionError::UnknownSign { .. })
        ));
    }

    #[test]
    fn test_ill_typed_values_parse_then_fail_validation() {
        for val in [r#""2""#, "true", r#"["a", 1]"#, r#"{"bin": 2}"#] {
            for sign in ["=", "is"] {
                let json = format!(r#"{{"feature": "a", "sign": "{sign}", "val": {val}}}"#);
                assert!(
                    matches!(parse(&json), Err(ConditionError::InvalidValue { .. })),
                    "{json}"
                );
            }
        }
    }

    #[test]
    fn test_one_bad_condition_keeps_the_rule_parseable() {
        let rule: Vec<ConditionSpec> = serde_json::from_str(
            r#"[{"feature": "a", "sign": ">"}, {"feature": "b", "sign": "=", "val": "2"}]"#,
        )
        .unwrap();
        assert_eq!(rule.len(), 2);
        assert_eq!(rule[1].val, Some(ConditionValue::Other(Value::from("2"))));
    }

    #[test]
    fn test_spec_roundtrip() {
        let condition = Condition::ConceptMembership {
            concept: "c".into(),
            tokens: vec!["x".into(), "y".into()],
        };
        let spec = ConditionSpec::from(&condition);
        assert_eq!(Condition::try_from(&spec).unwrap(), condition);
    }

    #[test]
    fn test_matches_value() {
        let token = Condition::TokenPresent { token: "t".into() };
        assert!(token.matches_value(1.0));
        assert!(token.matches_value(0.9999));
        assert!(!token.matches_value(0.5));
        let bin = Condition::CategoricalEquals {
            feature: "f".into(),
            bin: 1.0,
        };
        assert!(bin.matches_value(1.0));
        assert!(!bin.matches_value(2.0));
    }

    #[test]
    fn test_display() {
        let bin = Condition::CategoricalEquals {
            feature: "length".into(),
            bin: 2.0,
        };
        assert_eq!(bin.to_string(), "length = 2");
    }
}
