use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::CleanedTable;

// ---------------------------------------------------------------------------
// FilterSelection – what the sidebar hands us each render cycle
// ---------------------------------------------------------------------------

/// The user's current filter choices. An empty country or group set means
/// "no restriction on that dimension", matching every value; the year
/// bounds are inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub countries: BTreeSet<String>,
    pub groups: BTreeSet<String>,
    pub min_year: i32,
    pub max_year: i32,
}

impl FilterSelection {
    /// The default selection: no country/group restriction, years spanning
    /// the full observed range of the table.
    pub fn full_range(table: &CleanedTable) -> Self {
        let (min_year, max_year) = table.year_range.unwrap_or((0, 0));
        FilterSelection {
            countries: BTreeSet::new(),
            groups: BTreeSet::new(),
            min_year,
            max_year,
        }
    }
}

/// Return indices of records passing all three predicates (AND).
///
/// A record passes when:
/// * its country is in the selected set, or the set is empty (wildcard)
/// * its group is in the selected set, or the set is empty (wildcard)
/// * `min_year <= expiration_year <= max_year`
pub fn filtered_indices(table: &CleanedTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            (selection.countries.is_empty()
                || selection.countries.contains(rec.company_country.as_str()))
                && (selection.groups.is_empty()
                    || selection.groups.contains(rec.group_name.as_str()))
                && rec.expiration_year >= selection.min_year
                && rec.expiration_year <= selection.max_year
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Category, LicenseRecord};
    use chrono::NaiveDate;

    fn record(licence: &str, country: &str, group: &str, year: i32) -> LicenseRecord {
        LicenseRecord {
            licence_number: licence.to_string(),
            company_name: format!("{licence} Co"),
            company_country: Category::from(country),
            group_name: Category::from(group),
            product_or_service: Category::from("product"),
            product_or_service_name: None,
            expiration_date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            expiration_year: year,
            code_type: None,
        }
    }

    fn table() -> CleanedTable {
        CleanedTable::from_records(vec![
            record("EU/001", "FR", "Paints", 2019),
            record("EU/002", "DE", "Textiles", 2020),
            record("EU/003", "IT", "Paints", 2021),
            record("EU/004", "FR", "Textiles", 2020),
        ])
    }

    fn selection(countries: &[&str], groups: &[&str], years: (i32, i32)) -> FilterSelection {
        FilterSelection {
            countries: countries.iter().map(|s| s.to_string()).collect(),
            groups: groups.iter().map(|s| s.to_string()).collect(),
            min_year: years.0,
            max_year: years.1,
        }
    }

    #[test]
    fn empty_selection_matches_everything() {
        let table = table();
        let all = filtered_indices(&table, &FilterSelection::full_range(&table));
        assert_eq!(all, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_set_equals_every_value_selected() {
        let table = table();
        let wildcard = selection(&[], &[], (2019, 2021));
        let explicit = selection(&["FR", "DE", "IT"], &[], (2019, 2021));
        assert_eq!(
            filtered_indices(&table, &wildcard),
            filtered_indices(&table, &explicit)
        );
    }

    #[test]
    fn predicates_are_conjoined() {
        let table = table();
        // FR AND Textiles AND 2020 → only EU/004.
        let sel = selection(&["FR"], &["Textiles"], (2020, 2020));
        assert_eq!(filtered_indices(&table, &sel), vec![3]);

        // FR alone matches two records.
        let sel = selection(&["FR"], &[], (2019, 2021));
        assert_eq!(filtered_indices(&table, &sel), vec![0, 3]);
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let table = table();
        let sel = selection(&[], &[], (2020, 2020));
        assert_eq!(filtered_indices(&table, &sel), vec![1, 3]);

        let sel = selection(&[], &[], (2019, 2020));
        assert_eq!(filtered_indices(&table, &sel), vec![0, 1, 3]);
    }

    #[test]
    fn disjoint_selection_matches_nothing() {
        let table = table();
        let sel = selection(&["ES"], &[], (2019, 2021));
        assert!(filtered_indices(&table, &sel).is_empty());

        let sel = selection(&[], &[], (1990, 1999));
        assert!(filtered_indices(&table, &sel).is_empty());
    }

    #[test]
    fn full_range_defaults_to_observed_years() {
        let table = table();
        let sel = FilterSelection::full_range(&table);
        assert_eq!((sel.min_year, sel.max_year), (2019, 2021));
        assert!(sel.countries.is_empty());
        assert!(sel.groups.is_empty());
    }
}
