//! Scenes: one named unit of logic, background work, and UI.

use crate::effects::Saga;
use crate::logic::Logic;
use crate::reducer::{create_combined_reducer, Reducer};
use crate::saga::create_combined_saga;
use crate::view::Component;
use std::sync::Arc;

/// A set of logic containers plus optional sagas and a view component,
/// addressable by name. The combined reducer and the combined worker are
/// built at construction; the worker exists iff sagas were given.
pub struct Scene {
    pub name: String,
    pub logic: Vec<Arc<Logic>>,
    pub reducer: Reducer,
    pub sagas: Option<Vec<Saga>>,
    pub worker: Option<Saga>,
    pub component: Component,
}

impl Scene {
    pub fn new(
        name: impl Into<String>,
        logic: Vec<Arc<Logic>>,
        sagas: Option<Vec<Saga>>,
        component: Component,
    ) -> Arc<Self> {
        let reducer = create_combined_reducer(&logic);
        let worker = sagas.as_ref().map(|sagas| create_combined_saga(sagas.clone()));
        Arc::new(Self {
            name: name.into(),
            logic,
            reducer,
            sagas,
            worker,
            component,
        })
    }
}

/// Alias for [`Scene::new`].
pub fn create_scene(
    name: impl Into<String>,
    logic: Vec<Arc<Logic>>,
    sagas: Option<Vec<Saga>>,
    component: Component,
) -> Arc<Scene> {
    Scene::new(name, logic, sagas, component)
}
