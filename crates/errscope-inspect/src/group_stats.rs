//! Error counts of a matched document set, grouped by attribute value.
//!
//! A key names either a document attribute (looked up in the per-document
//! JSON objects) or a high-level feature column. Documents are looked up
//! first. Unknown keys are skipped. Without keys, the rows are grouped by
//! every high-level feature column.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::InspectionData;

/// Errors and total count of the documents sharing one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCount {
    pub value: Value,
    pub errors: usize,
    pub total: usize,
}

/// `"by_<key>"` to its groups, each sorted by value.
pub type GroupStats = BTreeMap<String, Vec<GroupCount>>;

/// Groups `doc_list` by each of `keys`, or by every high-level feature when
/// `keys` is empty.
#[must_use]
pub fn group_stats(data: &InspectionData, doc_list: &[usize], keys: &[String]) -> GroupStats {
    let keys = if keys.is_empty() {
        data.hfeat().map_or(&[][..], |hfeat| hfeat.names())
    } else {
        keys
    };
    let mut stats = GroupStats::new();
    for key in keys {
        let values = if data.documents().iter().any(|doc| doc.contains_key(key)) {
            doc_list
                .iter()
                .map(|&row| {
                    data.documents()
                        .get(row)
                        .and_then(|doc| doc.get(key))
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect::<Vec<_>>()
        } else if let Some(column) = data.hfeat().and_then(|hfeat| hfeat.column(key)) {
            doc_list
                .iter()
                .map(|&row| column.get(row).map_or(Value::Null, |&v| Value::from(v)))
                .collect()
        } else {
            tracing::debug!(%key, "skipping unknown group key");
            continue;
        };
        let groups = count_by_value(
            doc_list
                .iter()
                .map(|&row| data.is_error().get(row).is_some_and(|&e| e != 0))
                .zip(values),
        );
        stats.insert(format!("by_{key}"), groups);
    }
    stats
}

fn count_by_value(rows: impl Iterator<Item = (bool, Value)>) -> Vec<GroupCount> {
    // serialized form orders and identifies values of any JSON type
    let mut groups = BTreeMap::<String, GroupCount>::new();
    for (is_error, value) in rows {
        let group = groups
            .entry(value.to_string())
            .or_insert_with(|| GroupCount {
                value,
                errors: 0,
                total: 0,
            });
        group.total += 1;
        group.errors += usize::from(is_error);
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::tests::sample;

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|&k| k.to_owned()).collect()
    }

    #[test]
    fn test_groups_by_document_attribute() {
        let data = sample();
        let stats = group_stats(&data, &[0, 1, 2, 3, 5], &keys(&["source"]));
        assert_eq!(
            stats["by_source"],
            vec![
                GroupCount {
                    value: json!("app"),
                    errors: 1,
                    total: 1
                },
                GroupCount {
                    value: json!("web"),
                    errors: 2,
                    total: 3
                },
                GroupCount {
                    value: Value::Null,
                    errors: 0,
                    total: 1
                },
            ]
        );
    }

    #[test]
    fn test_groups_by_high_level_feature() {
        let data = sample();
        let stats = group_stats(&data, &[0, 1, 4], &keys(&["length", "missing"]));
        assert_eq!(stats.len(), 1);
        let groups = &stats["by_length"];
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].value, json!(2.0));
        assert_eq!((groups[0].errors, groups[0].total), (2, 3));
    }

    #[test]
    fn test_no_keys_groups_by_every_high_level_feature() {
        let data = sample();
        let stats = group_stats(&data, &[0, 2, 3], &[]);
        assert_eq!(stats.keys().collect::<Vec<_>>(), vec!["by_length"]);
        let totals = stats["by_length"]
            .iter()
            .map(|g| (g.value.clone(), g.errors, g.total))
            .collect::<Vec<_>>();
        assert_eq!(
            totals,
            vec![(json!(0.0), 1, 1), (json!(1.0), 0, 1), (json!(2.0), 1, 1)]
        );

        let labels_only = InspectionData::new(vec![0, 1]);
        assert!(group_stats(&labels_only, &[0, 1], &[]).is_empty());
    }
}
