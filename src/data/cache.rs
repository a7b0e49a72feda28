use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use super::loader::{self, LoadOutcome};

// ---------------------------------------------------------------------------
// Process-wide memoized load
// ---------------------------------------------------------------------------

/// One cleaned table per input file for the lifetime of the process.
/// The table is immutable after cleaning, so sharing it across sessions
/// behind an `Arc` is safe; the only invalidation is [`clear`].
static TABLE_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<LoadOutcome>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Load through the cache: the first call for a path reads and cleans the
/// file, later calls return the shared result without touching disk.
/// Failed loads are memoized too, keeping repeated calls idempotent.
pub fn load_cached(path: &Path) -> Arc<LoadOutcome> {
    let key = cache_key(path);
    let mut cache = TABLE_CACHE.lock().expect("table cache poisoned");
    if let Some(hit) = cache.get(&key) {
        log::debug!("table cache hit for {}", key.display());
        return Arc::clone(hit);
    }
    let outcome = Arc::new(loader::load(path));
    cache.insert(key, Arc::clone(&outcome));
    outcome
}

/// Drop every cached table. The next [`load_cached`] per path re-reads
/// the file.
pub fn clear() {
    TABLE_CACHE.lock().expect("table cache poisoned").clear();
}

/// Canonicalize so `./data.csv` and `data.csv` share an entry. A path
/// that cannot be canonicalized (typically: missing file) keys by its
/// literal form.
fn cache_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
