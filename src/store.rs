//! The running store.
//!
//! Holds the slice-reducer registry, the current state tree (a watch
//! channel), and the action broadcast sagas `take` from. Scenes are attached
//! dynamically: the first navigation to a route mounts the scene's reducer
//! under the scene name and starts its combined worker.

use crate::action::Action;
use crate::effects::{spawn_worker, Dispatcher, Effects, Worker};
use crate::logic::Logic;
use crate::reducer::{combine_reducers, slice_reducers, Reducer};
use crate::scene::Scene;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const ACTION_CHANNEL_CAPACITY: usize = 256;

/// Top-level state key scene reducers mount under. A scene named `home` owns
/// the subtree at `scenes.home`, which is where its logic paths must point.
pub const SCENES_KEY: &str = "scenes";

pub struct Store {
    inner: Mutex<StoreInner>,
    state_tx: watch::Sender<Value>,
    actions: broadcast::Sender<Action>,
    cancel: CancellationToken,
}

struct StoreInner {
    slices: IndexMap<String, Reducer>,
    scene_slices: IndexMap<String, Reducer>,
    root: Reducer,
    scenes: IndexMap<String, SceneEntry>,
}

impl StoreInner {
    fn rebuild_root(&mut self) {
        let mut slices = self.slices.clone();
        if !self.scene_slices.is_empty() {
            slices.insert(
                SCENES_KEY.to_string(),
                combine_reducers(self.scene_slices.clone()),
            );
        }
        self.root = combine_reducers(slices);
    }
}

struct SceneEntry {
    worker: Option<Worker>,
}

impl Store {
    /// Build a store seeded with the given root-level logic containers
    /// (validated with the same skip-and-report policy as the reducer
    /// combinator). The initial state is the root reducer's default shape.
    pub fn new(logics: &[Arc<Logic>]) -> Arc<Self> {
        let slices = slice_reducers(logics);
        let root = combine_reducers(slices.clone());
        let initial = root(None, &Action::init());
        let (state_tx, _) = watch::channel(initial);
        let (actions, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);
        Arc::new(Self {
            inner: Mutex::new(StoreInner {
                slices,
                scene_slices: IndexMap::new(),
                root,
                scenes: IndexMap::new(),
            }),
            state_tx,
            actions,
            cancel: CancellationToken::new(),
        })
    }

    /// Snapshot of the current state tree.
    pub fn state(&self) -> Value {
        self.state_tx.borrow().clone()
    }

    /// Watch the state tree for changes.
    pub fn subscribe(&self) -> watch::Receiver<Value> {
        self.state_tx.subscribe()
    }

    /// Reduce, publish the next state, then broadcast the action to waiting
    /// sagas. Dispatches are serialized.
    pub fn dispatch(&self, action: Action) {
        let inner = self.inner.lock().unwrap();
        let next = {
            let current = self.state_tx.borrow();
            (inner.root)(Some(&*current), &action)
        };
        self.state_tx.send_replace(next);
        drop(inner);
        let _ = self.actions.send(action);
    }

    /// Effect context bound to this store, scoped to the store's lifetime.
    pub fn effects(self: &Arc<Self>) -> Effects {
        let weak = Arc::downgrade(self);
        let dispatcher: Dispatcher = Arc::new(move |action| {
            if let Some(store) = weak.upgrade() {
                store.dispatch(action);
            }
        });
        Effects::new(
            self.state_tx.subscribe(),
            self.actions.clone(),
            self.cancel.child_token(),
            dispatcher,
        )
    }

    /// Attach a scene: mount its combined reducer at `scenes.<name>`,
    /// materialize the new slice, and start its worker. Idempotent by name.
    ///
    /// Needs a running tokio runtime when the scene has a worker.
    pub fn add_scene(self: &Arc<Self>, scene: &Arc<Scene>) {
        let mut inner = self.inner.lock().unwrap();
        if inner.scenes.contains_key(&scene.name) {
            debug!(scene = %scene.name, "scene already attached");
            return;
        }

        inner
            .scene_slices
            .insert(scene.name.clone(), Arc::clone(&scene.reducer));
        inner.rebuild_root();
        let next = {
            let current = self.state_tx.borrow();
            (inner.root)(Some(&*current), &Action::init())
        };
        self.state_tx.send_replace(next);

        let worker = scene
            .worker
            .as_ref()
            .map(|worker| spawn_worker(worker, self.effects()));
        inner.scenes.insert(scene.name.clone(), SceneEntry { worker });
        info!(scene = %scene.name, "scene attached");
    }

    /// Detach a scene: cancel its worker and unmount its slice.
    pub async fn remove_scene(&self, name: &str) {
        let removed = {
            let mut inner = self.inner.lock().unwrap();
            let Some(entry) = inner.scenes.shift_remove(name) else {
                debug!(scene = %name, "remove_scene: scene not attached");
                return;
            };
            inner.scene_slices.shift_remove(name);
            inner.rebuild_root();
            let next = {
                let current = self.state_tx.borrow();
                (inner.root)(Some(&*current), &Action::init())
            };
            self.state_tx.send_replace(next);
            entry
        };
        if let Some(worker) = removed.worker {
            worker.cancel().await;
        }
        info!(scene = %name, "scene detached");
    }

    /// Cancel every scene worker and wait for them to terminate.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let workers: Vec<Worker> = {
            let mut inner = self.inner.lock().unwrap();
            inner
                .scenes
                .values_mut()
                .filter_map(|entry| entry.worker.take())
                .collect()
        };
        for worker in workers {
            worker.cancel().await;
        }
    }
}
