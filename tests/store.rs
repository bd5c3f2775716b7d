//! End-to-end: store, scenes, workers, and logic queries together.

use indexmap::IndexMap;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stagehand::{
    component, create_logic, create_selectors, path, saga, scene_loader, Action, EffectError,
    Effects, Logic, Reducer, Scene, SelectorMap, Store,
};
use tokio::time::timeout;

/// Route worker diagnostics through the test harness's captured output.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn counter_reducer() -> Reducer {
    Arc::new(|state: Option<&Value>, action: &Action| {
        let count = state
            .and_then(|s| s.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let next = match action.kind.as_str() {
            "counter/increment" => count + 1,
            _ => count,
        };
        json!({ "count": next })
    })
}

fn counter_logic_at(parts: &[&str]) -> Arc<Logic> {
    let reducer = counter_reducer();
    create_logic()
        .path(parts.iter().copied())
        .reducer(reducer.clone())
        .selectors(create_selectors(
            path(parts.iter().copied()),
            &reducer,
            SelectorMap::new(),
        ))
        .build()
}

fn counter_logic() -> Arc<Logic> {
    counter_logic_at(&["counter"])
}

#[tokio::test]
async fn dispatch_folds_state_through_mounted_slices() {
    init_tracing();
    let store = Store::new(&[counter_logic()]);
    assert_eq!(store.state(), json!({"counter": {"count": 0}}));

    store.dispatch(Action::plain("counter/increment"));
    store.dispatch(Action::plain("counter/increment"));
    assert_eq!(store.state()["counter"]["count"], json!(2));

    store.dispatch(Action::plain("unrelated"));
    assert_eq!(store.state()["counter"]["count"], json!(2));
}

#[tokio::test]
async fn logic_get_and_fetch_read_through_the_effect_context() {
    init_tracing();
    let logic = counter_logic();
    let store = Store::new(&[Arc::clone(&logic)]);
    let fx = store.effects();

    assert_eq!(logic.get(&fx, None).await.unwrap(), json!({"count": 0}));
    assert_eq!(logic.get(&fx, Some("count")).await.unwrap(), json!(0));

    store.dispatch(Action::plain("counter/increment"));

    // Keys resolve sequentially, in listed order.
    let fetched = logic.fetch(&fx, &["count", "root"]).await.unwrap();
    let keys: Vec<_> = fetched.keys().map(String::as_str).collect();
    assert_eq!(keys, ["count", "root"]);
    assert_eq!(fetched["count"], json!(1));
    assert_eq!(fetched["root"], json!({"count": 1}));

    assert!(matches!(
        logic.get(&fx, Some("missing")).await,
        Err(EffectError::UnknownSelector(_))
    ));
}

#[tokio::test]
async fn add_scene_materializes_the_slice_and_starts_the_worker() {
    init_tracing();
    // Worker: every "ping" action becomes a counter increment.
    let ping_pong = saga(|fx: Effects| async move {
        loop {
            fx.take("ping").await?;
            fx.dispatch(Action::plain("counter/increment"));
        }
    });

    let scene = Scene::new(
        "home",
        vec![counter_logic_at(&["scenes", "home", "counter"])],
        Some(vec![ping_pong]),
        component(|_| String::new()),
    );

    let store = Store::new(&[]);
    assert_eq!(store.state(), json!({}));

    store.add_scene(&scene);
    store.add_scene(&scene); // attaching twice is a no-op
    assert_eq!(
        store.state(),
        json!({"scenes": {"home": {"counter": {"count": 0}}}})
    );

    // Keep pinging until the worker has seen one; its first take may start
    // after our first dispatch.
    let mut rx = store.subscribe();
    let reacted = timeout(Duration::from_secs(2), async {
        loop {
            store.dispatch(Action::plain("ping"));
            tokio::time::sleep(Duration::from_millis(10)).await;
            let count = rx.borrow()["scenes"]["home"]["counter"]["count"]
                .as_i64()
                .unwrap_or(0);
            if count >= 1 {
                break;
            }
        }
    })
    .await;
    assert!(reacted.is_ok(), "scene worker never reacted to ping");

    store.shutdown().await;
}

#[tokio::test]
async fn remove_scene_unmounts_the_slice_and_stops_the_worker() {
    init_tracing();
    let started = Arc::new(tokio::sync::Notify::new());
    let saw_cancellation = Arc::new(AtomicBool::new(false));
    let notify = Arc::clone(&started);
    let flag = Arc::clone(&saw_cancellation);
    let idle = saga(move |fx: Effects| {
        let notify = Arc::clone(&notify);
        let flag = Arc::clone(&flag);
        async move {
            notify.notify_one();
            fx.cancellation().cancelled().await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        }
    });

    let scene = Scene::new(
        "transient",
        vec![counter_logic_at(&["scenes", "transient", "counter"])],
        Some(vec![idle]),
        component(|_| String::new()),
    );

    let store = Store::new(&[]);
    store.add_scene(&scene);
    assert!(store.state()["scenes"].get("transient").is_some());

    // The worker is spawned but not yet polled; detaching before it runs
    // would cancel it before the saga body ever starts.
    timeout(Duration::from_secs(1), started.notified())
        .await
        .expect("scene worker never started");

    store.remove_scene("transient").await;
    assert!(store.state()["scenes"].get("transient").is_none());
    assert!(saw_cancellation.load(Ordering::SeqCst));
}

#[tokio::test]
async fn route_loader_registers_the_scene_on_first_navigation() {
    init_tracing();
    let loads = Arc::new(AtomicUsize::new(0));
    let scene = Scene::new(
        "home",
        vec![counter_logic_at(&["scenes", "home", "counter"])],
        None,
        component(|state| format!("home: {state}")),
    );

    let store = Store::new(&[]);
    let loader_scene = Arc::clone(&scene);
    let loader_loads = Arc::clone(&loads);
    let loader = scene_loader(move || {
        let scene = Arc::clone(&loader_scene);
        let loads = Arc::clone(&loader_loads);
        async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(scene)
        }
    });

    let mut routes = IndexMap::new();
    routes.insert("/".to_string(), loader);
    let tree = stagehand::get_routes(
        component(|_| "app".to_string()),
        Arc::clone(&store),
        routes,
    );

    assert_eq!(tree.child_routes.len(), 1);
    assert_eq!(tree.child_routes[0].path, "/");
    assert_eq!(store.state(), json!({}));

    let resolved = tree.child_routes[0].get_component().await.unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(store.state()["scenes"].get("home").is_some());
    assert!(resolved.render(&store.state()).starts_with("home:"));

    store.shutdown().await;
}
