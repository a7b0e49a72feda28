//! Core of the EU Ecolabel licence dashboard: load and clean the licence
//! CSV once, then filter and aggregate it into chart-ready views on every
//! interaction. Rendering is left to an external collaborator that
//! consumes [`view::DashboardView`].

pub mod data;
pub mod state;
pub mod view;

/// Default input file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "eu_ecolabel_data.csv";
