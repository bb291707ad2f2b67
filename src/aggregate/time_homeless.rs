use tracing::debug;

use super::{CrossTab, Series};
use crate::record::{Condition, Record};

/// Time-homeless buckets, in the order that wins ties.
pub const TIME_HOMELESS_BUCKETS: [&str; 5] = [
    "1 a 5 anos",
    "6 a 12 meses",
    "menos de 6 meses",
    "mais de 5 anos",
    "nao informado",
];

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    with_condition: u64,
    without_condition: u64,
}

/// Cross-tabulate the charted conditions against time-homeless buckets.
///
/// All five buckets are always present. Buckets are ordered by their total
/// positive count across the charted conditions, largest first; equal totals
/// keep [`TIME_HOMELESS_BUCKETS`] order. Records whose bucket is not one of
/// the five are ignored.
pub fn aggregate_by_time_homeless(records: &[Record]) -> CrossTab {
    // tallies[condition][bucket]
    let mut tallies = [[Tally::default(); TIME_HOMELESS_BUCKETS.len()]; Condition::CHARTED.len()];

    for r in records {
        let Some(bucket) = TIME_HOMELESS_BUCKETS
            .iter()
            .position(|b| *b == r.time_homeless)
        else {
            continue;
        };
        for (ci, condition) in Condition::CHARTED.iter().enumerate() {
            let t = &mut tallies[ci][bucket];
            if r.has(*condition) {
                t.with_condition += 1;
            } else {
                t.without_condition += 1;
            }
        }
    }

    let total = |bucket: usize| -> u64 {
        tallies.iter().map(|per_bucket| per_bucket[bucket].with_condition).sum()
    };
    for (b, name) in TIME_HOMELESS_BUCKETS.iter().enumerate() {
        let negatives: u64 = tallies.iter().map(|per_bucket| per_bucket[b].without_condition).sum();
        debug!(bucket = *name, positives = total(b), negatives, "time-homeless tally");
    }
    let mut order: Vec<usize> = (0..TIME_HOMELESS_BUCKETS.len()).collect();
    // stable: ties keep declaration order
    order.sort_by(|a, b| total(*b).cmp(&total(*a)));

    let series = Condition::CHARTED
        .iter()
        .zip(tallies.iter())
        .map(|(condition, per_bucket)| Series {
            name: condition.label(),
            data: order.iter().map(|&b| per_bucket[b].with_condition).collect(),
        })
        .collect();

    CrossTab {
        categories: order
            .iter()
            .map(|&b| TIME_HOMELESS_BUCKETS[b].to_string())
            .collect(),
        series,
    }
}
