use std::collections::{BTreeMap, HashMap};

use super::{capitalize_first, CrossTab, Series};
use crate::record::{Record, TextField};

/// Cross-tabulate the values of `field` against race/color.
///
/// Categories are the distinct values of `field` in code-point order. There
/// is one series per race/color value, ordered by first appearance while
/// walking the sorted categories, and every series carries a count (zero if
/// unobserved) for every category.
pub fn aggregate_by_field(records: &[Record], field: TextField) -> CrossTab {
    let mut groups: BTreeMap<&str, HashMap<&str, u64>> = BTreeMap::new();
    for r in records {
        *groups
            .entry(r.text(field))
            .or_default()
            .entry(r.race_color.as_str())
            .or_default() += 1;
    }

    // first-seen order per group follows record order
    let mut seen_order: HashMap<&str, Vec<&str>> = HashMap::new();
    for r in records {
        let order = seen_order.entry(r.text(field)).or_default();
        if !order.contains(&r.race_color.as_str()) {
            order.push(r.race_color.as_str());
        }
    }

    let mut races: Vec<&str> = Vec::new();
    for category in groups.keys() {
        for race in &seen_order[category] {
            if !races.contains(race) {
                races.push(*race);
            }
        }
    }

    let series = races
        .iter()
        .map(|race| Series {
            name: capitalize_first(race),
            data: groups
                .values()
                .map(|by_race| by_race.get(race).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    CrossTab {
        categories: groups.keys().map(|c| c.to_string()).collect(),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(region: &str, race: &str) -> Record {
        Record {
            region: region.to_string(),
            municipality: format!("{region}-MUN"),
            race_color: race.to_string(),
            ..Record::default()
        }
    }

    #[test]
    fn dense_series_aligned_to_sorted_categories() {
        let records = vec![
            rec("SUL", "PARDA"),
            rec("NORTE", "BRANCA"),
            rec("SUL", "PRETA"),
            rec("NORTE", "PARDA"),
            rec("SUL", "PARDA"),
            rec("CENTRAL", "AMARELA"),
        ];
        let out = aggregate_by_field(&records, TextField::Region);

        assert_eq!(out.categories, vec!["CENTRAL", "NORTE", "SUL"]);
        let names: Vec<&str> = out.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Amarela", "Branca", "Parda", "Preta"]);
        for s in &out.series {
            assert_eq!(s.data.len(), out.categories.len());
        }
        assert_eq!(out.series[0].data, vec![1, 0, 0]);
        assert_eq!(out.series[1].data, vec![0, 1, 0]);
        assert_eq!(out.series[2].data, vec![0, 1, 2]);
        assert_eq!(out.series[3].data, vec![0, 0, 1]);

        let total: u64 = (0..out.categories.len()).map(|i| out.category_total(i)).sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn groups_by_any_text_field() {
        let records = vec![rec("SUL", "PARDA"), rec("NORTE", "")];
        let out = aggregate_by_field(&records, TextField::Municipality);
        assert_eq!(out.categories, vec!["NORTE-MUN", "SUL-MUN"]);
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.series[0].name, "");
        assert_eq!(out.series[0].data, vec![1, 0]);
        assert_eq!(out.series[1].name, "Parda");
        assert_eq!(out.series[1].data, vec![0, 1]);
    }

    #[test]
    fn empty_records_give_empty_tab() {
        let out = aggregate_by_field(&[], TextField::MacroRegion);
        assert!(out.categories.is_empty());
        assert!(out.series.is_empty());
    }
}
