use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use thiserror::Error;

use super::model::{columns, CleanedTable, Diagnostics, Interner, LicenseRecord};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Everything that can abort a load. None of these cross the [`load`]
/// boundary: they are converted into an empty table plus an error
/// diagnostic.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found at {0}")]
    FileNotFound(String),
    #[error("missing required columns; expected {expected:?}, found {found:?}")]
    Structural {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// What a load always returns: the cleaned table (possibly the empty
/// sentinel) and the advisory messages produced along the way.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: CleanedTable,
    pub diagnostics: Diagnostics,
}

impl LoadOutcome {
    /// Whether the load failed (empty sentinel with at least one error).
    pub fn failed(&self) -> bool {
        self.table.is_empty() && self.diagnostics.has_errors()
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean a semicolon-delimited Ecolabel licence export.
///
/// Never returns an error: any failure yields the empty-table sentinel
/// plus an error-severity diagnostic, so the caller always has a valid
/// (if empty) table to hand to the filter layer.
pub fn load(path: &Path) -> LoadOutcome {
    let mut diagnostics = Diagnostics::default();
    match clean_file(path, &mut diagnostics) {
        Ok(table) => LoadOutcome { table, diagnostics },
        Err(err) => {
            diagnostics.error(format!("Data loading failed: {err}"));
            LoadOutcome {
                table: CleanedTable::empty(),
                diagnostics,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaning pipeline
// ---------------------------------------------------------------------------

fn clean_file(path: &Path, diagnostics: &mut Diagnostics) -> Result<CleanedTable, LoadError> {
    if !path.is_file() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }

    // 1. Parse as `;`-separated text. `flexible` keeps ragged rows instead
    //    of failing the whole file on one short line.
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    log::debug!("initial rows: {}", rows.len());

    // 2. Drop fully duplicate rows, keeping first occurrences.
    let before = rows.len();
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
    rows.retain(|row| seen.insert(row.clone()));
    let duplicates = before - rows.len();
    if duplicates > 0 {
        diagnostics.info(format!("Removed {duplicates} duplicate rows."));
    }
    log::debug!("rows after deduplication: {}", rows.len());

    // 3 + 4. Lenient-parse the expiration date and drop rows where it is
    // missing or unparseable.
    let date_idx = headers
        .iter()
        .position(|h| h == columns::EXPIRATION_DATE)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "column '{}' not present in {:?}",
                columns::EXPIRATION_DATE,
                headers
            )
        })?;

    let before = rows.len();
    let mut dated: Vec<(Vec<String>, NaiveDate)> = Vec::with_capacity(before);
    for row in rows {
        let raw = row.get(date_idx).map(String::as_str).unwrap_or("");
        if let Some(date) = parse_date_lenient(raw) {
            dated.push((row, date));
        }
    }
    let invalid_dates = before - dated.len();
    if invalid_dates > 0 {
        diagnostics.warning(format!(
            "Removed {invalid_dates} rows with invalid expiration dates."
        ));
    }
    log::debug!("rows after date validation: {}", dated.len());

    // 7. Required-column validation (`expiration_year` is derived below,
    //    so its requirement is satisfied by the date column surviving the
    //    steps above).
    let missing = columns::REQUIRED
        .iter()
        .any(|col| *col != columns::EXPIRATION_YEAR && !headers.iter().any(|h| h == col));
    if missing {
        return Err(LoadError::Structural {
            expected: columns::REQUIRED.iter().map(|c| c.to_string()).collect(),
            found: headers,
        });
    }

    // 5 + 6. Derive the year and build typed rows, interning the
    // low-cardinality columns. Optional columns are skipped when absent.
    let col = |name: &str| headers.iter().position(|h| h == name);
    let licence_idx = col(columns::LICENCE_NUMBER).unwrap_or_default();
    let company_idx = col(columns::COMPANY_NAME).unwrap_or_default();
    let country_idx = col(columns::COMPANY_COUNTRY).unwrap_or_default();
    let group_idx = col(columns::GROUP_NAME).unwrap_or_default();
    let kind_idx = col(columns::PRODUCT_OR_SERVICE).unwrap_or_default();
    let name_idx = col(columns::PRODUCT_OR_SERVICE_NAME);
    let code_idx = col(columns::CODE_TYPE);

    let mut interner = Interner::default();
    let mut records = Vec::with_capacity(dated.len());
    for (row, date) in dated {
        let field = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("").trim();
        let optional = |idx: Option<usize>| {
            idx.map(|i| field(i)).filter(|v| !v.is_empty())
        };

        records.push(LicenseRecord {
            licence_number: field(licence_idx).to_string(),
            company_name: field(company_idx).to_string(),
            company_country: interner.intern(field(country_idx)),
            group_name: interner.intern(field(group_idx)),
            product_or_service: interner.intern(field(kind_idx)),
            product_or_service_name: optional(name_idx).map(str::to_string),
            expiration_date: date,
            expiration_year: date.year(),
            code_type: optional(code_idx).map(|v| interner.intern(v)),
        });
    }
    log::debug!("final rows after cleaning: {}", records.len());

    Ok(CleanedTable::from_records(records))
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Lenient date parse: unparseable text becomes `None`, never an error.
/// Tries the date-only formats seen in EU open-data exports, then the
/// common datetime shapes.
fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Severity;
    use std::fmt::Write as _;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HEADER: &str = "licence_number;company_name;company_country;group_name;product_or_service;product_or_service_name;expiration_date;code_type";

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn row(licence: &str, company: &str, country: &str, group: &str, date: &str) -> String {
        format!("{licence};{company};{country};{group};product;Some product;{date};EUEB")
    }

    #[test]
    fn cleans_well_formed_file() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{HEADER}\n{}\n{}\n",
            row("EU/001", "Acme", "France", "Paints", "2025-06-30"),
            row("EU/002", "Bolt", "Germany", "Textiles", "2024-01-15"),
        );
        let path = write_csv(&dir, "data.csv", &content);

        let outcome = load(&path);
        assert!(!outcome.failed());
        assert!(outcome.diagnostics.is_empty());
        let table = &outcome.table;
        assert_eq!(table.len(), 2);
        assert_eq!(table.countries, vec!["France", "Germany"]);
        assert_eq!(table.year_range, Some((2024, 2025)));

        let rec = &table.records[0];
        assert_eq!(rec.licence_number, "EU/001");
        assert_eq!(rec.expiration_year, 2025);
        assert_eq!(
            rec.expiration_date,
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
        );
        assert_eq!(rec.code_type.as_ref().unwrap().as_str(), "EUEB");
    }

    #[test]
    fn year_always_matches_date() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{HEADER}\n{}\n{}\n{}\n",
            row("EU/001", "Acme", "France", "Paints", "2025-06-30"),
            row("EU/002", "Bolt", "Germany", "Textiles", "31/12/2024"),
            row("EU/003", "Cask", "Italy", "Paper", "2023-02-01 12:30:00"),
        );
        let path = write_csv(&dir, "data.csv", &content);

        let outcome = load(&path);
        assert_eq!(outcome.table.len(), 3);
        for rec in &outcome.table.records {
            assert_eq!(rec.expiration_year, rec.expiration_date.year());
        }
    }

    #[test]
    fn counts_duplicates_and_invalid_dates() {
        // 100 raw rows: 95 distinct, 5 exact repeats, and 3 of the
        // distinct rows carry unparseable dates. Expect 92 cleaned rows.
        let dir = TempDir::new().unwrap();
        let mut content = String::from(HEADER);
        content.push('\n');
        for i in 0..95 {
            let date = if i < 3 { "not-a-date" } else { "2025-03-01" };
            let line = row(
                &format!("EU/{i:03}"),
                &format!("Company {i}"),
                "France",
                "Paints",
                date,
            );
            writeln!(content, "{line}").unwrap();
            if i < 5 {
                writeln!(content, "{line}").unwrap();
            }
        }
        let path = write_csv(&dir, "data.csv", &content);

        let outcome = load(&path);
        assert_eq!(outcome.table.len(), 92);

        let messages: Vec<_> = outcome.diagnostics.iter().collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].severity, Severity::Info);
        assert!(messages[0].message.contains("5 duplicate rows"));
        assert_eq!(messages[1].severity, Severity::Warning);
        assert!(messages[1].message.contains("3 rows with invalid expiration dates"));
    }

    #[test]
    fn missing_required_column_yields_empty_table() {
        let dir = TempDir::new().unwrap();
        // No company_name column.
        let content = "licence_number;company_country;group_name;product_or_service;expiration_date\n\
                       EU/001;France;Paints;product;2025-06-30\n";
        let path = write_csv(&dir, "data.csv", content);

        let outcome = load(&path);
        assert!(outcome.failed());
        assert!(outcome.table.is_empty());
        let error = outcome
            .diagnostics
            .iter()
            .find(|d| d.severity == Severity::Error)
            .unwrap();
        assert!(error.message.contains("company_name"));
        assert!(error.message.contains("expected"));
    }

    #[test]
    fn missing_date_column_yields_empty_table() {
        let dir = TempDir::new().unwrap();
        let content = "licence_number;company_name;company_country;group_name;product_or_service\n\
                       EU/001;Acme;France;Paints;product\n";
        let path = write_csv(&dir, "data.csv", content);

        let outcome = load(&path);
        assert!(outcome.failed());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.message.contains("expiration_date")));
    }

    #[test]
    fn missing_file_yields_empty_table() {
        let outcome = load(Path::new("/nonexistent/eu_ecolabel_data.csv"));
        assert!(outcome.failed());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error && d.message.contains("not found")));
    }

    #[test]
    fn optional_columns_are_skipped_silently() {
        let dir = TempDir::new().unwrap();
        // No product_or_service_name, no code_type.
        let content = "licence_number;company_name;company_country;group_name;product_or_service;expiration_date\n\
                       EU/001;Acme;France;Paints;product;2025-06-30\n";
        let path = write_csv(&dir, "data.csv", content);

        let outcome = load(&path);
        assert!(!outcome.failed());
        let rec = &outcome.table.records[0];
        assert_eq!(rec.product_or_service_name, None);
        assert_eq!(rec.code_type, None);
    }

    #[test]
    fn lenient_date_parse_formats() {
        assert_eq!(
            parse_date_lenient("2025-06-30"),
            NaiveDate::from_ymd_opt(2025, 6, 30)
        );
        assert_eq!(
            parse_date_lenient("30/06/2025"),
            NaiveDate::from_ymd_opt(2025, 6, 30)
        );
        assert_eq!(
            parse_date_lenient("30.06.2025"),
            NaiveDate::from_ymd_opt(2025, 6, 30)
        );
        assert_eq!(
            parse_date_lenient("2025-06-30T08:00:00"),
            NaiveDate::from_ymd_opt(2025, 6, 30)
        );
        assert_eq!(parse_date_lenient(""), None);
        assert_eq!(parse_date_lenient("soon"), None);
        assert_eq!(parse_date_lenient("2025-13-01"), None);
    }
}
