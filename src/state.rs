use std::sync::Arc;

use crate::data::filter::FilterSelection;
use crate::data::loader::LoadOutcome;
use crate::view::{render, DashboardView};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Host-side session state: the loaded (shared, immutable) table, the
/// current filter selection, and the view computed from them. Every
/// selection change recomputes the view in full.
pub struct DashboardState {
    /// Shared load result; the table inside is never mutated.
    pub outcome: Arc<LoadOutcome>,
    /// Current sidebar selection.
    pub selection: FilterSelection,
    /// View model for the current selection.
    pub view: DashboardView,
}

impl DashboardState {
    /// Start a session from a load result with the default (unrestricted)
    /// selection.
    pub fn new(outcome: Arc<LoadOutcome>) -> Self {
        let selection = FilterSelection::full_range(&outcome.table);
        let mut state = DashboardState {
            outcome,
            selection,
            view: DashboardView::Empty,
        };
        state.refresh();
        state
    }

    /// Replace the whole selection (e.g. deserialized from the host).
    pub fn set_selection(&mut self, selection: FilterSelection) {
        self.selection = selection;
        self.refresh();
    }

    /// Toggle one country in the selection.
    pub fn toggle_country(&mut self, country: &str) {
        if !self.selection.countries.remove(country) {
            self.selection.countries.insert(country.to_string());
        }
        self.refresh();
    }

    /// Toggle one product/service group in the selection.
    pub fn toggle_group(&mut self, group: &str) {
        if !self.selection.groups.remove(group) {
            self.selection.groups.insert(group.to_string());
        }
        self.refresh();
    }

    /// Set the inclusive expiration-year range.
    pub fn set_year_range(&mut self, min_year: i32, max_year: i32) {
        self.selection.min_year = min_year;
        self.selection.max_year = max_year;
        self.refresh();
    }

    /// Back to the unrestricted default selection.
    pub fn reset_filters(&mut self) {
        self.selection = FilterSelection::full_range(&self.outcome.table);
        self.refresh();
    }

    fn refresh(&mut self) {
        // A failed load never reaches the filter/aggregate layer.
        self.view = if self.outcome.table.is_empty() {
            DashboardView::Empty
        } else {
            render(&self.outcome.table, &self.selection)
        };
    }
}
