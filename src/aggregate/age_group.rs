use serde::Serialize;
use std::collections::HashMap;

use super::locale_cmp;
use crate::record::{Condition, Record};

/// Positive counts of one condition per age group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeGroupCounts {
    pub condition: Condition,
    /// Legend label for `condition`.
    pub label: String,
    pub categories: Vec<String>,
    pub counts: Vec<u64>,
}

/// Count records with `condition` set, grouped by age group.
///
/// Every age group seen in `records` becomes a category (the blank one
/// included), even when none of its records has the condition.
pub fn aggregate_by_age_group(records: &[Record], condition: Condition) -> AgeGroupCounts {
    let mut groups: HashMap<&str, u64> = HashMap::new();
    for r in records {
        let count = groups.entry(r.age_group.as_str()).or_default();
        if r.has(condition) {
            *count += 1;
        }
    }

    let mut categories: Vec<&str> = groups.keys().copied().collect();
    categories.sort_by(|a, b| locale_cmp(a, b));

    AgeGroupCounts {
        condition,
        label: condition.label(),
        counts: categories.iter().map(|c| groups[c]).collect(),
        categories: categories.into_iter().map(str::to_string).collect(),
    }
}
