use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::process::date_parser::extract_year;
use crate::record::Record;

pub const MALE: &str = "MASCULINO";
pub const FEMALE: &str = "FEMININO";

/// Registration year of a record. Records without a usable date land in
/// `Unknown`, which orders after every known year.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum YearKey {
    Known(String),
    Unknown,
}

impl YearKey {
    pub fn of(record: &Record) -> Self {
        record
            .registration_date
            .as_deref()
            .and_then(extract_year)
            .map_or(YearKey::Unknown, YearKey::Known)
    }

    pub fn label(&self) -> &str {
        match self {
            YearKey::Known(year) => year,
            YearKey::Unknown => "Sem data",
        }
    }
}

impl Serialize for YearKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Registrations per year, split by gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGenderCounts {
    pub categories: Vec<YearKey>,
    pub male: Vec<u64>,
    pub female: Vec<u64>,
}

/// Count registrations per year for each gender.
///
/// Any gender other than [`MALE`]/[`FEMALE`] still opens its year bucket but
/// adds to neither count. Known years sort as text, which is chronological
/// only because every year has four digits.
pub fn aggregate_by_year(records: &[Record]) -> YearGenderCounts {
    let mut years: BTreeMap<YearKey, (u64, u64)> = BTreeMap::new();
    for r in records {
        let counts = years.entry(YearKey::of(r)).or_default();
        match r.gender.as_str() {
            MALE => counts.0 += 1,
            FEMALE => counts.1 += 1,
            _ => {}
        }
    }

    let mut out = YearGenderCounts {
        categories: Vec::with_capacity(years.len()),
        male: Vec::with_capacity(years.len()),
        female: Vec::with_capacity(years.len()),
    };
    for (year, (male, female)) in years {
        out.categories.push(year);
        out.male.push(male);
        out.female.push(female);
    }
    out
}
