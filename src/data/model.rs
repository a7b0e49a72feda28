use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Source-CSV column names, referenced by name throughout the pipeline.
pub mod columns {
    pub const LICENCE_NUMBER: &str = "licence_number";
    pub const COMPANY_NAME: &str = "company_name";
    pub const COMPANY_COUNTRY: &str = "company_country";
    pub const GROUP_NAME: &str = "group_name";
    pub const PRODUCT_OR_SERVICE: &str = "product_or_service";
    pub const PRODUCT_OR_SERVICE_NAME: &str = "product_or_service_name";
    pub const EXPIRATION_DATE: &str = "expiration_date";
    pub const EXPIRATION_YEAR: &str = "expiration_year";
    pub const CODE_TYPE: &str = "code_type";

    /// Columns the cleaned table must end up with (`expiration_year` is
    /// derived from `expiration_date` during cleaning).
    pub const REQUIRED: [&str; 6] = [
        LICENCE_NUMBER,
        COMPANY_NAME,
        COMPANY_COUNTRY,
        GROUP_NAME,
        EXPIRATION_YEAR,
        PRODUCT_OR_SERVICE,
    ];
}

// ---------------------------------------------------------------------------
// Category – interned low-cardinality string
// ---------------------------------------------------------------------------

/// An interned categorical value. Rows sharing the same country, group,
/// etc. share one allocation; equality, ordering and display all go by
/// the underlying text, so the interning stays invisible to callers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category(Arc<str>);

impl Category {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category(Arc::from(s))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Per-load intern table handing out shared [`Category`] values.
#[derive(Debug, Default)]
pub(crate) struct Interner(BTreeSet<Arc<str>>);

impl Interner {
    pub fn intern(&mut self, s: &str) -> Category {
        if let Some(existing) = self.0.get(s) {
            return Category(Arc::clone(existing));
        }
        let value: Arc<str> = Arc::from(s);
        self.0.insert(Arc::clone(&value));
        Category(value)
    }
}

// ---------------------------------------------------------------------------
// LicenseRecord – one cleaned row
// ---------------------------------------------------------------------------

/// A single product/service row of the cleaned table. One licence may
/// span several rows, so `licence_number` is not unique per row.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseRecord {
    pub licence_number: String,
    pub company_name: String,
    pub company_country: Category,
    pub group_name: Category,
    pub product_or_service: Category,
    /// Free-text product name; the source column is optional.
    pub product_or_service_name: Option<String>,
    /// Always present after cleaning; rows without a parseable date are
    /// dropped by the loader.
    pub expiration_date: NaiveDate,
    /// Year component of `expiration_date`.
    pub expiration_year: i32,
    pub code_type: Option<Category>,
}

// ---------------------------------------------------------------------------
// CleanedTable – the validated, immutable dataset
// ---------------------------------------------------------------------------

/// The full cleaned dataset with pre-computed filter options. Built once
/// per input file and never mutated afterwards; an empty table is the
/// sentinel for a failed load.
#[derive(Debug, Clone, Default)]
pub struct CleanedTable {
    /// All cleaned rows.
    pub records: Vec<LicenseRecord>,
    /// Sorted unique country names (country filter options).
    pub countries: Vec<String>,
    /// Sorted unique group names (group filter options).
    pub groups: Vec<String>,
    /// Observed `(min, max)` expiration years; `None` when empty.
    pub year_range: Option<(i32, i32)>,
}

impl CleanedTable {
    /// Build the filter-option indices from the cleaned rows.
    pub fn from_records(records: Vec<LicenseRecord>) -> Self {
        let mut countries: BTreeSet<&str> = BTreeSet::new();
        let mut groups: BTreeSet<&str> = BTreeSet::new();
        let mut year_range: Option<(i32, i32)> = None;

        for rec in &records {
            countries.insert(rec.company_country.as_str());
            groups.insert(rec.group_name.as_str());
            year_range = Some(match year_range {
                Some((lo, hi)) => (lo.min(rec.expiration_year), hi.max(rec.expiration_year)),
                None => (rec.expiration_year, rec.expiration_year),
            });
        }

        let countries = countries.into_iter().map(str::to_string).collect();
        let groups = groups.into_iter().map(str::to_string).collect();
        CleanedTable {
            records,
            countries,
            groups,
            year_range,
        }
    }

    /// The EmptyTable sentinel returned on any load failure.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Diagnostics – advisory messages emitted while cleaning
// ---------------------------------------------------------------------------

/// Severity of an advisory message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One advisory message produced during loading.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Ordered advisory messages for the rendering collaborator. Messages are
/// mirrored to the log as they are recorded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.push(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.push(Severity::Error, message);
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.0.push(Diagnostic { severity, message });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, group: &str, year: i32) -> LicenseRecord {
        LicenseRecord {
            licence_number: "EU/030/001".to_string(),
            company_name: "Acme".to_string(),
            company_country: Category::from(country),
            group_name: Category::from(group),
            product_or_service: Category::from("product"),
            product_or_service_name: None,
            expiration_date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            expiration_year: year,
            code_type: None,
        }
    }

    #[test]
    fn interner_shares_allocations() {
        let mut interner = Interner::default();
        let a = interner.intern("France");
        let b = interner.intern("France");
        let c = interner.intern("Germany");
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_ne!(a, c);
        assert_eq!(c.as_str(), "Germany");
    }

    #[test]
    fn from_records_builds_filter_options() {
        let table = CleanedTable::from_records(vec![
            record("France", "Paints", 2024),
            record("Germany", "Textiles", 2022),
            record("France", "Textiles", 2026),
        ]);
        assert_eq!(table.countries, vec!["France", "Germany"]);
        assert_eq!(table.groups, vec!["Paints", "Textiles"]);
        assert_eq!(table.year_range, Some((2022, 2026)));
    }

    #[test]
    fn empty_table_is_sentinel() {
        let table = CleanedTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.year_range, None);
    }

    #[test]
    fn diagnostics_track_severity() {
        let mut diags = Diagnostics::default();
        assert!(diags.is_empty());
        diags.info("Removed 5 duplicate rows.");
        diags.warning("Removed 3 rows with invalid expiration dates.");
        assert!(!diags.has_errors());
        diags.error("Data file not found.");
        assert!(diags.has_errors());
        assert_eq!(diags.iter().count(), 3);
    }
}
