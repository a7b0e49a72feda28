//! View layer: turn the cleaned table plus a filter selection into the
//! full set of chart/table/metric inputs for the rendering collaborator.
//!
//! [`render`] is the whole per-interaction pipeline: filter, then build
//! every aggregation view from the filtered subset. It is a pure function
//! of its inputs, so the host can call it on every interaction without
//! caring about execution order or shared state.

pub mod aggregate;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::filter::{filtered_indices, FilterSelection};
use crate::data::model::CleanedTable;
use aggregate::{CountEntry, CrossTab, Kpis, YearEntry};

/// How many filtered rows the data-table widget shows.
pub const SAMPLE_ROW_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// One row of the "filtered data sample" table (display column subset).
#[derive(Debug, Clone, Serialize)]
pub struct SampleRow {
    pub licence_number: String,
    pub product_or_service_name: Option<String>,
    pub group_name: String,
    pub company_name: String,
    pub company_country: String,
    pub expiration_date: NaiveDate,
}

/// Everything the dashboard widgets need for one render cycle.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub kpis: Kpis,
    pub licences_by_country: Vec<CountEntry>,
    pub top_groups: Vec<CountEntry>,
    pub licences_by_year: Vec<YearEntry>,
    pub top_companies: Vec<CountEntry>,
    /// `None` means the top-group/top-country restriction left no rows:
    /// the widget shows "not enough overlap" instead of an empty chart.
    pub group_country_crosstab: Option<CrossTab>,
    pub product_service_split: Vec<CountEntry>,
    pub sample_rows: Vec<SampleRow>,
    /// Total filtered row count (not distinct licences).
    pub matched_rows: usize,
}

/// The per-interaction result handed to the rendering collaborator.
/// `Empty` is the explicit "no data matches" state; no aggregation runs
/// over an empty subset.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardView {
    Empty,
    Ready(DashboardData),
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        matches!(self, DashboardView::Empty)
    }
}

// ---------------------------------------------------------------------------
// Render pipeline
// ---------------------------------------------------------------------------

/// Filter the table and compute every aggregation view from the subset.
/// Recomputed fresh per interaction; nothing is cached across calls.
pub fn render(table: &CleanedTable, selection: &FilterSelection) -> DashboardView {
    let indices = filtered_indices(table, selection);
    if indices.is_empty() {
        return DashboardView::Empty;
    }

    DashboardView::Ready(DashboardData {
        kpis: aggregate::kpis(table, &indices),
        licences_by_country: aggregate::licences_by_country(table, &indices),
        top_groups: aggregate::top_groups(table, &indices),
        licences_by_year: aggregate::licences_by_year(table, &indices),
        top_companies: aggregate::top_companies(table, &indices),
        group_country_crosstab: aggregate::group_country_crosstab(table, &indices),
        product_service_split: aggregate::product_service_split(table, &indices),
        sample_rows: sample_rows(table, &indices),
        matched_rows: indices.len(),
    })
}

/// The first [`SAMPLE_ROW_LIMIT`] filtered rows, projected onto the
/// display columns.
fn sample_rows(table: &CleanedTable, indices: &[usize]) -> Vec<SampleRow> {
    indices
        .iter()
        .take(SAMPLE_ROW_LIMIT)
        .map(|&i| {
            let rec = &table.records[i];
            SampleRow {
                licence_number: rec.licence_number.clone(),
                product_or_service_name: rec.product_or_service_name.clone(),
                group_name: rec.group_name.to_string(),
                company_name: rec.company_name.to_string(),
                company_country: rec.company_country.to_string(),
                expiration_date: rec.expiration_date,
            }
        })
        .collect()
}
