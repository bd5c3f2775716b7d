//! Route table construction.
//!
//! Wires scenes to navigation paths. Each child route carries an async
//! component loader: on first navigation it resolves the scene (the lazy
//! module-load analogue), registers it into the running store, and hands the
//! scene's component back.

use crate::scene::Scene;
use crate::store::Store;
use crate::view::Component;
use anyhow::Result;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::future::Future;
use std::sync::Arc;
use tracing::error;

/// Async loader standing in for a lazily imported scene module.
pub type SceneLoader = Arc<dyn Fn() -> BoxFuture<'static, Result<Arc<Scene>>> + Send + Sync>;

/// Wrap an async closure into a [`SceneLoader`].
pub fn scene_loader<F, Fut>(f: F) -> SceneLoader
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<Scene>>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}

pub struct RouteNode {
    pub component: Component,
    pub child_routes: Vec<ChildRoute>,
}

pub struct ChildRoute {
    pub path: String,
    loader: Arc<dyn Fn() -> BoxFuture<'static, Result<Component>> + Send + Sync>,
}

impl ChildRoute {
    /// Resolve this route's component, registering its scene into the store
    /// on first use. Loader failures propagate to the caller.
    pub async fn get_component(&self) -> Result<Component> {
        (self.loader)().await
    }
}

fn lazy_load(
    store: Arc<Store>,
    loader: SceneLoader,
) -> Arc<dyn Fn() -> BoxFuture<'static, Result<Component>> + Send + Sync> {
    Arc::new(move || {
        let store = Arc::clone(&store);
        let loader = Arc::clone(&loader);
        Box::pin(async move {
            let scene = loader().await?;
            store.add_scene(&scene);
            Ok(scene.component.clone())
        })
    })
}

/// Build the route tree: a root node wrapping `app`, one child per route.
pub fn get_routes(
    app: Component,
    store: Arc<Store>,
    routes: IndexMap<String, SceneLoader>,
) -> RouteNode {
    RouteNode {
        component: app,
        child_routes: routes
            .into_iter()
            .map(|(path, loader)| ChildRoute {
                path,
                loader: lazy_load(Arc::clone(&store), loader),
            })
            .collect(),
    }
}

/// Map each route to the scene named for it. A route naming an unknown scene
/// is reported and omitted; the rest of the table still builds.
pub fn combine_scenes_and_routes(
    scenes: &IndexMap<String, Arc<Scene>>,
    routes: &IndexMap<String, String>,
) -> IndexMap<String, Arc<Scene>> {
    let mut combined = IndexMap::new();
    for (route, scene_name) in routes {
        match scenes.get(scene_name) {
            Some(scene) => {
                combined.insert(route.clone(), Arc::clone(scene));
            }
            None => {
                error!(scene = %scene_name, route = %route, "scene not found in scenes map");
            }
        }
    }
    combined
}
