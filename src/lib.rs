//! Logic containers, combined reducers and supervised sagas for scene-based
//! applications.
//!
//! `stagehand` binds three concerns into one "logic" abstraction: a
//! reducer/store combinator over a dynamic state tree, an async effect layer
//! for background sagas, and memoized selectors. On top of those it offers
//! scenes (logic + sagas + a view component) and lazily-loaded route tables
//! that attach a scene's reducer and worker to the running store on first
//! navigation.
//!
//! Typical wiring:
//!
//! ```ignore
//! let logic = create_logic()
//!     .path(["scenes", "slider"])
//!     .reducer(slider_reducer())
//!     .selectors(create_selectors(path(["scenes", "slider"]), &slider_reducer(), extra))
//!     .build();
//!
//! let scene = Scene::new("slider", vec![logic], Some(vec![polling_saga]), slider_view);
//! let store = Store::new(&[]);
//! let tree = get_routes(app_view, store.clone(), route_loaders);
//! ```
//!
//! Malformed configuration (a logic without a path or reducer, an uneven
//! props mapping, an unknown scene name) degrades to a partially-built result
//! plus a `tracing` diagnostic; it never panics and never aborts the build.

pub mod action;
pub mod effects;
pub mod logic;
pub mod path;
pub mod props;
pub mod reducer;
pub mod routes;
pub mod saga;
pub mod scene;
pub mod selector;
pub mod store;
pub mod view;

pub use action::{action_creator, Action, ActionCreator, INIT_ACTION};
pub use effects::{saga, EffectError, Effects, Saga, Worker};
pub use logic::{create_logic, Logic, LogicBuilder};
pub use path::{path, resolve, Path, PathPart};
pub use props::{select_props_from_logic, PropsMapEntry, SelectorSource};
pub use reducer::{combine_reducers, create_combined_reducer, Reducer};
pub use routes::{
    combine_scenes_and_routes, get_routes, scene_loader, ChildRoute, RouteNode, SceneLoader,
};
pub use saga::{create_combined_saga, WORKER_CANCELLATION};
pub use scene::{create_scene, Scene};
pub use selector::{
    create_selector, create_selectors, create_structured_selector, path_selector, Selector,
    SelectorMap,
};
pub use store::{Store, SCENES_KEY};
pub use view::{component, Component, FnView, SceneView};
