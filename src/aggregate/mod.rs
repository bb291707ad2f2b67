//! Grouping and cross-tabulation of registry records into chart-ready
//! categories and series. Every function here takes the full record slice
//! and recomputes from scratch.

use serde::Serialize;
use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub mod age_group;
pub mod location;
pub mod time_homeless;
pub mod year_gender;

pub use age_group::{aggregate_by_age_group, AgeGroupCounts};
pub use location::aggregate_by_field;
pub use time_homeless::{aggregate_by_time_homeless, TIME_HOMELESS_BUCKETS};
pub use year_gender::{aggregate_by_year, YearGenderCounts, YearKey};

/// One named series, positionally aligned with its owner's categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<u64>,
}

/// Categories crossed with several series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

#[cfg(test)]
impl CrossTab {
    /// Sum of every series at category `idx`.
    pub fn category_total(&self, idx: usize) -> u64 {
        self.series.iter().map(|s| s.data[idx]).sum()
    }
}

/// Collation-style ordering for Portuguese labels.
///
/// Levels, in order: base letters with accents and case removed
/// (punctuation and spaces before digits, digits before letters), then
/// accents, then case with lowercase first, then plain code points.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_key(a)
        .cmp(&base_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(&case_key(b)))
        .then_with(|| a.cmp(b))
}

fn char_class(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

fn base_key(s: &str) -> Vec<(u8, char)> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| (char_class(c), c))
        .collect()
}

// each base character contributes 0, followed by its combining marks
fn accent_key(s: &str) -> Vec<u32> {
    s.nfd()
        .map(|c| if is_combining_mark(c) { u32::from(c) } else { 0 })
        .collect()
}

fn case_key(s: &str) -> Vec<bool> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
        .collect()
}

/// `"PARDA"` → `"Parda"`: first character upper-cased, the rest lower-cased.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}
