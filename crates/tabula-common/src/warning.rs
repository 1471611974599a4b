//! Deduplicated warnings.
//!
//! Rendering a table with a hundred cells that all hit the same degraded path
//! (no fallback font, an unknown markup attribute) should say so once, not a
//! hundred times. Messages go through the `log` facade so the embedding
//! application decides where they end up.

use std::collections::HashSet;
use std::sync::Mutex;

/// Global set of warnings we've already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a degraded rendering path (emitted once per unique message).
///
/// # Example
/// ```ignore
/// warn_once("markup", "ignoring unknown attribute 'size' on <text>");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    // A poisoned lock only means another thread panicked mid-insert; the set
    // itself is still usable.
    let should_emit = match WARNED.lock() {
        Ok(mut guard) => guard.get_or_insert_with(HashSet::new).insert(key),
        Err(poisoned) => poisoned
            .into_inner()
            .get_or_insert_with(HashSet::new)
            .insert(key),
    };

    if should_emit {
        log::warn!(target: "tabula", "[{component}] {message}");
    }
}

/// Forget all recorded warnings so they can be emitted again.
pub fn clear_warnings() {
    let mut guard = match WARNED.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
