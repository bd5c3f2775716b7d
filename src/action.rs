use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Action kind dispatched to reducers to obtain their default shape.
pub const INIT_ACTION: &str = "@stagehand/init";

/// A dispatched event: a kind string plus an arbitrary payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: String,
    pub payload: Value,
}

impl Action {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// An action carrying no payload.
    pub fn plain(kind: impl Into<String>) -> Self {
        Self::new(kind, Value::Null)
    }

    /// The initialization action. Reducers answer it with their default shape.
    pub fn init() -> Self {
        Self::plain(INIT_ACTION)
    }
}

/// Builds an [`Action`] of a fixed kind from a payload.
pub type ActionCreator = Arc<dyn Fn(Value) -> Action + Send + Sync>;

/// Make an action creator for the given kind.
pub fn action_creator(kind: impl Into<String>) -> ActionCreator {
    let kind = kind.into();
    Arc::new(move |payload| Action::new(kind.clone(), payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_creator_fixes_the_kind() {
        let increment = action_creator("counter/increment");
        let action = increment(json!(5));
        assert_eq!(action.kind, "counter/increment");
        assert_eq!(action.payload, json!(5));
    }

    #[test]
    fn init_action_has_no_payload() {
        let action = Action::init();
        assert_eq!(action.kind, INIT_ACTION);
        assert_eq!(action.payload, Value::Null);
    }
}
