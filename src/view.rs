//! The view seam.
//!
//! The actual UI system stays outside this crate; scenes and routes only
//! store components and hand them back. A component is anything that can
//! render the current state tree to displayable text.

use serde_json::Value;
use std::sync::Arc;

pub trait SceneView: Send + Sync {
    fn render(&self, state: &Value) -> String;
}

pub type Component = Arc<dyn SceneView>;

/// Adapter turning a closure into a [`SceneView`].
pub struct FnView<F>(pub F);

impl<F> SceneView for FnView<F>
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn render(&self, state: &Value) -> String {
        (self.0)(state)
    }
}

/// Wrap a closure into a [`Component`].
pub fn component<F>(f: F) -> Component
where
    F: Fn(&Value) -> String + Send + Sync + 'static,
{
    Arc::new(FnView(f))
}
