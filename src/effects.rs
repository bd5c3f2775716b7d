//! The effect context handed to sagas.
//!
//! Sagas are async tasks driven by the tokio runtime; "concurrency" here is
//! interleaved suspension, never parallel mutation. Every primitive on
//! [`Effects`] is an await point, and all of them observe the context's
//! cancellation token so a cancelled saga unwinds at its next suspension.

use crate::action::Action;
use crate::selector::Selector;
use futures::future::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("effect context cancelled")]
    Cancelled,
    #[error("action channel closed")]
    ActionsClosed,
    #[error("unknown selector \"{0}\"")]
    UnknownSelector(String),
    #[error("logic has no root selector")]
    NoRootSelector,
}

/// A cooperative background worker: invoked with an effect context, runs until
/// it finishes, fails, or is cancelled.
pub type Saga = Arc<dyn Fn(Effects) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Wrap an async closure into a [`Saga`].
pub fn saga<F, Fut>(f: F) -> Saga
where
    F: Fn(Effects) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |fx| Box::pin(f(fx)))
}

pub(crate) type Dispatcher = Arc<dyn Fn(Action) + Send + Sync>;

/// Capability bundle for one saga: read captured state, await actions, fork
/// and cancel child workers, dispatch back into the store.
#[derive(Clone)]
pub struct Effects {
    state: watch::Receiver<Value>,
    actions: broadcast::Sender<Action>,
    cancel: CancellationToken,
    dispatcher: Dispatcher,
}

impl Effects {
    pub(crate) fn new(
        state: watch::Receiver<Value>,
        actions: broadcast::Sender<Action>,
        cancel: CancellationToken,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            state,
            actions,
            cancel,
            dispatcher,
        }
    }

    /// Token scoping this context's lifetime. Child workers get child tokens.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Suspend once, then apply `selector` to the latest captured state.
    pub async fn select(&self, selector: Selector) -> Result<Value, EffectError> {
        if self.cancel.is_cancelled() {
            return Err(EffectError::Cancelled);
        }
        tokio::task::yield_now().await;
        Ok(selector(&self.state.borrow()))
    }

    /// Suspend until the next dispatched action of the given kind.
    ///
    /// Only actions dispatched while waiting are seen; a lagging subscriber
    /// skips what it missed rather than erroring.
    pub async fn take(&self, kind: &str) -> Result<Action, EffectError> {
        let mut rx = self.actions.subscribe();
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(EffectError::Cancelled),
                received = rx.recv() => match received {
                    Ok(action) if action.kind == kind => return Ok(action),
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(EffectError::ActionsClosed)
                    }
                },
            }
        }
    }

    /// Spawn `saga` as a child worker scoped to this context's lifetime.
    pub async fn fork(&self, saga: Saga) -> Result<Worker, EffectError> {
        if self.cancel.is_cancelled() {
            return Err(EffectError::Cancelled);
        }
        let child = Effects {
            state: self.state.clone(),
            actions: self.actions.clone(),
            cancel: self.cancel.child_token(),
            dispatcher: Arc::clone(&self.dispatcher),
        };
        let worker = spawn_worker(&saga, child);
        tokio::task::yield_now().await;
        Ok(worker)
    }

    /// Hand an action back to the store.
    pub fn dispatch(&self, action: Action) {
        (self.dispatcher)(action);
    }
}

/// Spawn a saga on the runtime under its context's cancellation token.
pub(crate) fn spawn_worker(saga: &Saga, fx: Effects) -> Worker {
    let token = fx.cancel.clone();
    let fut = saga(fx);
    let handle = tokio::spawn(async move {
        let result = fut.await;
        if let Err(err) = &result {
            // Unwinding through a cancelled suspension point is orderly, not a fault.
            if !matches!(err.downcast_ref::<EffectError>(), Some(EffectError::Cancelled)) {
                error!(error = %err, "saga worker failed");
            }
        }
        result
    });
    Worker { handle, token }
}

/// Handle to a forked worker.
pub struct Worker {
    handle: JoinHandle<anyhow::Result<()>>,
    token: CancellationToken,
}

impl Worker {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the worker and suspend until it has terminated.
    pub async fn cancel(self) {
        self.token.cancel();
        let _ = self.handle.await;
    }

    /// Wait for the worker to finish of its own accord.
    pub async fn join(self) -> anyhow::Result<()> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Ok(()),
            Err(err) => Err(anyhow::anyhow!("saga worker panicked: {err}")),
        }
    }
}
