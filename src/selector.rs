//! Memoized selectors over the state tree.
//!
//! A selector is a pure function from the global state to a derived value.
//! [`create_selector`] adds last-value memoization, [`create_structured_selector`]
//! assembles a fixed-shape object from named sub-selectors, and
//! [`create_selectors`] builds a per-slice selector map by inferring the field
//! set from a reducer's own default output.

use crate::action::Action;
use crate::path::{resolve, Path};
use crate::reducer::Reducer;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub type Selector = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Ordered mapping from selector name to selector.
pub type SelectorMap = IndexMap<String, Selector>;

/// Selector resolving `path` within the state tree. Missing segments map to
/// `Null`.
pub fn path_selector(path: Path) -> Selector {
    Arc::new(move |state| resolve(&path, state).cloned().unwrap_or(Value::Null))
}

/// Compose `input` with `compute`, recomputing only when the input selector's
/// output changes (last-value equality).
pub fn create_selector<F>(input: Selector, compute: F) -> Selector
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    let cache: Mutex<Option<(Value, Value)>> = Mutex::new(None);
    Arc::new(move |state| {
        let current = input(state);
        let mut cache = cache.lock().unwrap();
        if let Some((last_in, last_out)) = cache.as_ref() {
            if *last_in == current {
                return last_out.clone();
            }
        }
        let out = compute(&current);
        *cache = Some((current, out.clone()));
        out
    })
}

/// Selector producing an object with one key per entry of `map`, in map order.
pub fn create_structured_selector(map: SelectorMap) -> Selector {
    Arc::new(move |state| {
        let mut out = serde_json::Map::new();
        for (name, selector) in &map {
            out.insert(name.clone(), selector(state));
        }
        Value::Object(out)
    })
}

/// Build the selector map for a state slice.
///
/// The `root` entry resolves `path`; one memoized entry is added per top-level
/// key of the reducer's default shape (obtained by running the reducer with no
/// prior state). `extra` entries are merged on top and may override generated
/// ones.
pub fn create_selectors(path: Path, reducer: &Reducer, extra: SelectorMap) -> SelectorMap {
    let root = path_selector(path);
    let shape = reducer(None, &Action::init());

    let mut selectors = SelectorMap::new();
    selectors.insert("root".to_string(), Arc::clone(&root));

    if let Value::Object(fields) = shape {
        for key in fields.keys() {
            let field = key.clone();
            selectors.insert(
                key.clone(),
                create_selector(Arc::clone(&root), move |slice| {
                    slice.get(&field).cloned().unwrap_or(Value::Null)
                }),
            );
        }
    }

    for (name, selector) in extra {
        selectors.insert(name, selector);
    }
    selectors
}
