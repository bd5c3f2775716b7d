//! Logic containers.
//!
//! A [`Logic`] bundles everything one state slice needs: its path in the
//! state tree, its action creators, its reducer, and its selectors. Containers
//! are built once through [`LogicBuilder`], shared as `Arc<Logic>`, and
//! consumed by the reducer and selector combinators.

use crate::action::ActionCreator;
use crate::effects::{EffectError, Effects};
use crate::path::{Path, PathPart};
use crate::reducer::Reducer;
use crate::selector::{path_selector, Selector, SelectorMap};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub struct Logic {
    pub path: Path,
    pub actions: IndexMap<String, ActionCreator>,
    pub reducer: Option<Reducer>,
    pub selector: Option<Selector>,
    pub selectors: SelectorMap,
}

impl fmt::Debug for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logic")
            .field("path", &self.path)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("has_reducer", &self.reducer.is_some())
            .field("has_selector", &self.selector.is_some())
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Logic {
    pub fn builder() -> LogicBuilder {
        LogicBuilder::default()
    }

    /// Key this logic's reducer registers under: the last path segment.
    /// Reducers mount into an object, so a path ending in an array index has
    /// no mount key.
    pub fn mount_key(&self) -> Option<String> {
        match self.path.last()? {
            PathPart::Key(key) => Some(key.clone()),
            PathPart::Index(_) => None,
        }
    }

    /// Suspend once and return the value selected from the captured state:
    /// `selectors[key]` if a key is given, the root selector otherwise.
    pub async fn get(&self, fx: &Effects, key: Option<&str>) -> Result<Value, EffectError> {
        let selector = match key {
            Some(name) => self
                .selectors
                .get(name)
                .cloned()
                .ok_or_else(|| EffectError::UnknownSelector(name.to_string()))?,
            None => self
                .selector
                .clone()
                .ok_or(EffectError::NoRootSelector)?,
        };
        fx.select(selector).await
    }

    /// Resolve each key in listed order, one suspension per key, accumulating
    /// key to value.
    pub async fn fetch(
        &self,
        fx: &Effects,
        keys: &[&str],
    ) -> Result<IndexMap<String, Value>, EffectError> {
        let mut results = IndexMap::with_capacity(keys.len());
        for key in keys {
            let value = self.get(fx, Some(key)).await?;
            results.insert((*key).to_string(), value);
        }
        Ok(results)
    }
}

/// Start building a logic container.
pub fn create_logic() -> LogicBuilder {
    LogicBuilder::default()
}

/// Builder with explicit optional fields. If no root selector is supplied but
/// a path is, the builder derives one resolving that path.
#[derive(Default)]
pub struct LogicBuilder {
    path: Path,
    actions: IndexMap<String, ActionCreator>,
    reducer: Option<Reducer>,
    selector: Option<Selector>,
    selectors: SelectorMap,
}

impl LogicBuilder {
    pub fn path<I, T>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PathPart>,
    {
        self.path = parts.into_iter().map(Into::into).collect();
        self
    }

    pub fn action(mut self, name: impl Into<String>, creator: ActionCreator) -> Self {
        self.actions.insert(name.into(), creator);
        self
    }

    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = Some(reducer);
        self
    }

    pub fn selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn selectors(mut self, selectors: SelectorMap) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn build(self) -> Arc<Logic> {
        let selector = self.selector.or_else(|| {
            if self.path.is_empty() {
                None
            } else {
                Some(path_selector(self.path.clone()))
            }
        });
        Arc::new(Logic {
            path: self.path,
            actions: self.actions,
            reducer: self.reducer,
            selector,
            selectors: self.selectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::action_creator;
    use crate::path::path;
    use serde_json::json;

    #[test]
    fn builder_derives_the_root_selector_from_the_path() {
        let logic = create_logic().path(["scenes", "slider"]).build();
        let selector = logic.selector.as_ref().expect("derived selector");
        let state = json!({"scenes": {"slider": {"index": 4}}});
        assert_eq!(selector(&state), json!({"index": 4}));
        assert_eq!(logic.mount_key().as_deref(), Some("slider"));
    }

    #[test]
    fn builder_without_path_has_no_root_selector() {
        let logic = create_logic().build();
        assert!(logic.selector.is_none());
        assert!(logic.mount_key().is_none());
    }

    #[test]
    fn path_ending_in_an_index_has_no_mount_key() {
        let logic = create_logic()
            .path(vec![PathPart::from("items"), PathPart::Index(0)])
            .build();
        assert!(logic.mount_key().is_none());
    }

    #[test]
    fn supplied_selector_wins_over_the_derived_one() {
        let fixed: Selector = Arc::new(|_state: &Value| json!("fixed"));
        let logic = create_logic().path(["a"]).selector(fixed).build();
        assert_eq!(logic.selector.as_ref().unwrap()(&json!({"a": 1})), json!("fixed"));
    }

    #[test]
    fn actions_are_kept_in_declaration_order() {
        let logic = create_logic()
            .action("increment", action_creator("counter/increment"))
            .action("decrement", action_creator("counter/decrement"))
            .build();
        let names: Vec<_> = logic.actions.keys().map(String::as_str).collect();
        assert_eq!(names, ["increment", "decrement"]);
        assert_eq!(logic.actions["increment"](json!(1)).kind, "counter/increment");
    }

    #[test]
    fn selectors_from_path_selector_compose_with_create_selectors() {
        use crate::selector::create_selectors;
        let reducer: Reducer = Arc::new(|state, _| {
            state.cloned().unwrap_or_else(|| json!({"index": 0}))
        });
        let logic = create_logic()
            .path(["slider"])
            .reducer(reducer.clone())
            .selectors(create_selectors(path(["slider"]), &reducer, SelectorMap::new()))
            .build();
        let state = json!({"slider": {"index": 2}});
        assert_eq!(logic.selectors["index"](&state), json!(2));
        assert_eq!(logic.selectors["root"](&state), json!({"index": 2}));
    }
}
