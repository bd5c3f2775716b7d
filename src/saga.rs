//! The saga combinator.
//!
//! [`create_combined_saga`] wraps a set of sagas into one supervisor whose
//! lifetime scopes all of theirs: workers are forked sequentially in listed
//! order, the supervisor then blocks, and when it is cancelled (or one of its
//! own operations fails) every still-running worker is cancelled, one at a
//! time, in the same listed order.

use crate::effects::{EffectError, Effects, Saga, Worker};
use std::sync::Arc;
use tracing::debug;

/// Sentinel action kind the supervisor waits on after forking. It is never
/// dispatched by construction, so the wait only ends through cancellation.
pub const WORKER_CANCELLATION: &str = "@stagehand/worker-cancellation";

/// Fork `sagas` under one supervisor; cancel them all when the supervisor ends.
pub fn create_combined_saga(sagas: Vec<Saga>) -> Saga {
    Arc::new(move |fx: Effects| {
        let sagas = sagas.clone();
        Box::pin(async move {
            let mut workers: Vec<Worker> = Vec::with_capacity(sagas.len());

            let result: Result<(), EffectError> = async {
                for item in &sagas {
                    let worker = fx.fork(Arc::clone(item)).await?;
                    workers.push(worker);
                }
                loop {
                    fx.take(WORKER_CANCELLATION).await?;
                }
            }
            .await;

            if !workers.is_empty() {
                debug!(workers = workers.len(), "combined saga ending, cancelling workers");
            }
            for worker in workers {
                worker.cancel().await;
            }

            match result {
                Ok(()) | Err(EffectError::Cancelled) => Ok(()),
                Err(err) => Err(err.into()),
            }
        })
    })
}
