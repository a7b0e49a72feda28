use std::path::Path;
use std::process::ExitCode;

use ecodash::data::cache;
use ecodash::state::DashboardState;
use ecodash::DEFAULT_DATA_PATH;

fn main() -> ExitCode {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

    let outcome = cache::load_cached(Path::new(&path));
    for diag in outcome.diagnostics.iter() {
        eprintln!("[{:?}] {}", diag.severity, diag.message);
    }
    if outcome.table.is_empty() {
        eprintln!("Data could not be loaded. Dashboard cannot be displayed.");
        return ExitCode::FAILURE;
    }

    let state = DashboardState::new(outcome);
    match serde_json::to_string_pretty(&state.view) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Failed to serialize view model: {err}");
            ExitCode::FAILURE
        }
    }
}
