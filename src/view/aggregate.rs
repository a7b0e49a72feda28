use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::model::{CleanedTable, LicenseRecord};

/// Bar-chart truncation: keep the 15 highest-ranked entries.
pub const TOP_N: usize = 15;
/// Crosstab restriction: top 10 groups × top 10 countries.
pub const CROSSTAB_TOP: usize = 10;

const UK_LONG: &str = "United Kingdom of Great Britain and Northern Ireland";

// ---------------------------------------------------------------------------
// View entry types
// ---------------------------------------------------------------------------

/// One bar of a categorical chart: key → distinct-licence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub key: String,
    pub unique_licences: usize,
}

/// One bar of the expiration-trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearEntry {
    pub year: i32,
    pub unique_licences: usize,
}

/// The four headline metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub unique_licences: usize,
    pub unique_companies: usize,
    pub countries: usize,
    pub groups: usize,
}

/// One cell of the group × country stacked-bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTabCell {
    pub group: String,
    pub country: String,
    pub unique_licences: usize,
}

/// Group × country cross-tabulation over the most frequent groups and
/// countries. `groups`/`countries` carry the restriction order (row
/// frequency, descending); `cells` holds only the pairs that occur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    pub groups: Vec<String>,
    pub countries: Vec<String>,
    pub cells: Vec<CrossTabCell>,
}

// ---------------------------------------------------------------------------
// Grouping helpers
// ---------------------------------------------------------------------------

/// Group the filtered records by a key and count distinct licence numbers
/// per group. Output is sorted by key, ascending.
fn unique_count_by<'a, F>(table: &'a CleanedTable, indices: &[usize], key_of: F) -> Vec<CountEntry>
where
    F: Fn(&'a LicenseRecord) -> &'a str,
{
    let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for &i in indices {
        let rec = &table.records[i];
        groups
            .entry(key_of(rec))
            .or_default()
            .insert(rec.licence_number.as_str());
    }
    groups
        .into_iter()
        .map(|(key, licences)| CountEntry {
            key: key.to_string(),
            unique_licences: licences.len(),
        })
        .collect()
}

/// Rank by distinct-licence count descending and keep the first `n`.
/// Ties break alphabetically by key.
fn top_by_unique_licences(mut entries: Vec<CountEntry>, n: usize) -> Vec<CountEntry> {
    entries.sort_by(|a, b| {
        b.unique_licences
            .cmp(&a.unique_licences)
            .then_with(|| a.key.cmp(&b.key))
    });
    entries.truncate(n);
    entries
}

/// The `n` most frequent keys by raw row count (not distinct licences),
/// descending, ties alphabetical. This is the crosstab's restriction
/// metric, deliberately distinct from [`top_by_unique_licences`].
fn top_by_row_frequency<'a, F>(
    table: &'a CleanedTable,
    indices: &[usize],
    key_of: F,
    n: usize,
) -> Vec<String>
where
    F: Fn(&'a LicenseRecord) -> &'a str,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &i in indices {
        *counts.entry(key_of(&table.records[i])).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(n);
    ranked.into_iter().map(|(key, _)| key.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Chart views
// ---------------------------------------------------------------------------

/// Distinct licences per company country (choropleth input). The one
/// display tweak from the source dashboard is kept: the long-form United
/// Kingdom name is shortened so the map locator recognises it.
pub fn licences_by_country(table: &CleanedTable, indices: &[usize]) -> Vec<CountEntry> {
    unique_count_by(table, indices, |r| r.company_country.as_str())
        .into_iter()
        .map(|mut entry| {
            if entry.key == UK_LONG {
                entry.key = "United Kingdom".to_string();
            }
            entry
        })
        .collect()
}

/// Top 15 product/service groups by distinct licences.
pub fn top_groups(table: &CleanedTable, indices: &[usize]) -> Vec<CountEntry> {
    top_by_unique_licences(
        unique_count_by(table, indices, |r| r.group_name.as_str()),
        TOP_N,
    )
}

/// Top 15 companies by distinct licences.
pub fn top_companies(table: &CleanedTable, indices: &[usize]) -> Vec<CountEntry> {
    top_by_unique_licences(
        unique_count_by(table, indices, |r| r.company_name.as_str()),
        TOP_N,
    )
}

/// Distinct licences expiring per year, ascending by year.
pub fn licences_by_year(table: &CleanedTable, indices: &[usize]) -> Vec<YearEntry> {
    let mut groups: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();
    for &i in indices {
        let rec = &table.records[i];
        groups
            .entry(rec.expiration_year)
            .or_default()
            .insert(rec.licence_number.as_str());
    }
    groups
        .into_iter()
        .map(|(year, licences)| YearEntry {
            year,
            unique_licences: licences.len(),
        })
        .collect()
}

/// Distinct licences per product-vs-service classification (pie input).
pub fn product_service_split(table: &CleanedTable, indices: &[usize]) -> Vec<CountEntry> {
    unique_count_by(table, indices, |r| r.product_or_service.as_str())
}

/// Distinct-licence counts for every (group, country) pair among the top
/// 10 groups and top 10 countries by row frequency. Returns `None` when
/// no filtered row pairs a top group with a top country.
pub fn group_country_crosstab(table: &CleanedTable, indices: &[usize]) -> Option<CrossTab> {
    let groups = top_by_row_frequency(table, indices, |r| r.group_name.as_str(), CROSSTAB_TOP);
    let countries =
        top_by_row_frequency(table, indices, |r| r.company_country.as_str(), CROSSTAB_TOP);

    let group_set: BTreeSet<&str> = groups.iter().map(String::as_str).collect();
    let country_set: BTreeSet<&str> = countries.iter().map(String::as_str).collect();

    let mut cells: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
    for &i in indices {
        let rec = &table.records[i];
        let group = rec.group_name.as_str();
        let country = rec.company_country.as_str();
        if group_set.contains(group) && country_set.contains(country) {
            cells
                .entry((group, country))
                .or_default()
                .insert(rec.licence_number.as_str());
        }
    }
    if cells.is_empty() {
        return None;
    }

    let cells = cells
        .into_iter()
        .map(|((group, country), licences)| CrossTabCell {
            group: group.to_string(),
            country: country.to_string(),
            unique_licences: licences.len(),
        })
        .collect();
    Some(CrossTab {
        groups,
        countries,
        cells,
    })
}

/// The four headline metrics, each a distinct count over the filtered
/// rows. Callers must not invoke this on an empty subset; the render
/// layer short-circuits first.
pub fn kpis(table: &CleanedTable, indices: &[usize]) -> Kpis {
    let mut licences: BTreeSet<&str> = BTreeSet::new();
    let mut companies: BTreeSet<&str> = BTreeSet::new();
    let mut countries: BTreeSet<&str> = BTreeSet::new();
    let mut groups: BTreeSet<&str> = BTreeSet::new();
    for &i in indices {
        let rec = &table.records[i];
        licences.insert(rec.licence_number.as_str());
        companies.insert(rec.company_name.as_str());
        countries.insert(rec.company_country.as_str());
        groups.insert(rec.group_name.as_str());
    }
    Kpis {
        unique_licences: licences.len(),
        unique_companies: companies.len(),
        countries: countries.len(),
        groups: groups.len(),
    }
}
