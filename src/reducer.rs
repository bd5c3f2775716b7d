//! Reducer combination.
//!
//! A reducer is a pure function from prior state and an action to the next
//! state; called with no prior state it must return its default shape.
//! [`combine_reducers`] folds a keyed set of slice reducers into one root
//! reducer, and [`create_combined_reducer`] builds that set from a list of
//! logic containers, skipping (and reporting) malformed ones.

use crate::action::Action;
use crate::logic::Logic;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

pub type Reducer = Arc<dyn Fn(Option<&Value>, &Action) -> Value + Send + Sync>;

/// Fold a keyed set of slice reducers into one root reducer.
///
/// The combined output is an object with one key per slice; each slice reducer
/// sees only its own prior sub-state.
pub fn combine_reducers(slices: IndexMap<String, Reducer>) -> Reducer {
    Arc::new(move |state, action| {
        let mut out = serde_json::Map::new();
        for (key, slice) in &slices {
            let prior = state.and_then(|s| s.get(key.as_str()));
            out.insert(key.clone(), slice(prior, action));
        }
        Value::Object(out)
    })
}

/// Collect each logic's reducer under its last path segment.
///
/// A container missing its path or its reducer is reported and skipped; the
/// build never aborts over one bad entry.
pub(crate) fn slice_reducers(logics: &[Arc<Logic>]) -> IndexMap<String, Reducer> {
    let mut slices = IndexMap::new();
    for logic in logics {
        let Some(key) = logic.mount_key() else {
            error!(logic = ?logic, "no path found for reducer, skipping logic");
            continue;
        };
        let Some(reducer) = logic.reducer.clone() else {
            error!(logic = ?logic, "no reducer in logic, skipping");
            continue;
        };
        slices.insert(key, reducer);
    }
    slices
}

/// Fold a list of logic containers into one root reducer, registering each
/// surviving reducer under the last segment of its path.
pub fn create_combined_reducer(logics: &[Arc<Logic>]) -> Reducer {
    combine_reducers(slice_reducers(logics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::create_logic;
    use serde_json::json;

    fn counter_reducer() -> Reducer {
        Arc::new(|state, action| {
            let count = state
                .and_then(|s| s.get("count"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            let next = match action.kind.as_str() {
                "counter/increment" => count + 1,
                "counter/decrement" => count - 1,
                _ => count,
            };
            json!({ "count": next })
        })
    }

    #[test]
    fn mounts_each_reducer_under_its_last_path_segment() {
        let logic = create_logic()
            .path(["scenes", "counter"])
            .reducer(counter_reducer())
            .build();
        let root = create_combined_reducer(&[logic]);

        let initial = root(None, &Action::init());
        assert_eq!(initial, json!({"counter": {"count": 0}}));

        let next = root(Some(&initial), &Action::plain("counter/increment"));
        assert_eq!(next["counter"]["count"], json!(1));
    }

    #[test]
    fn malformed_containers_are_skipped_not_fatal() {
        let good = create_logic()
            .path(["counter"])
            .reducer(counter_reducer())
            .build();
        let missing_reducer = create_logic().path(["broken"]).build();
        let missing_path = create_logic().reducer(counter_reducer()).build();

        let root = create_combined_reducer(&[good, missing_reducer, missing_path]);
        let state = root(None, &Action::init());
        assert_eq!(state, json!({"counter": {"count": 0}}));
    }

    #[test]
    fn index_terminated_paths_are_skipped_like_missing_ones() {
        use crate::path::PathPart;
        let good = create_logic()
            .path(["counter"])
            .reducer(counter_reducer())
            .build();
        let indexed = create_logic()
            .path(vec![PathPart::from("items"), PathPart::Index(0)])
            .reducer(counter_reducer())
            .build();

        let root = create_combined_reducer(&[good, indexed]);
        assert_eq!(root(None, &Action::init()), json!({"counter": {"count": 0}}));
    }

    #[test]
    fn slices_only_see_their_own_sub_state() {
        let passthrough: Reducer = Arc::new(|state, _| state.cloned().unwrap_or(json!("fresh")));
        let mut slices = IndexMap::new();
        slices.insert("a".to_string(), passthrough.clone());
        slices.insert("b".to_string(), passthrough);
        let root = combine_reducers(slices);

        let prior = json!({"a": "kept", "b": "kept too"});
        let next = root(Some(&prior), &Action::plain("noop"));
        assert_eq!(next, json!({"a": "kept", "b": "kept too"}));
        assert_eq!(root(None, &Action::init()), json!({"a": "fresh", "b": "fresh"}));
    }
}
