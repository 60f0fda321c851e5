//! Callback-driven, non-blocking execution over a [`CollectionManager`]
//!
//! Every submission moves `Submitted -> InFlight -> Completed | Failed`. The
//! success callback runs at most once, and only on success. Failures go to the
//! error reporter and are also returned from [`Submission::wait`].
//!
//! The façade owns no executor: work is spawned onto the ambient tokio runtime.
//! Independently submitted operations have no ordering guarantee between them.

use crate::error::{DataError, Result};
use crate::query::{DeleteQuery, SelectQuery};
use crate::traits::CollectionManager;
use crate::types::ResultSet;
use crate::value::Entity;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Lifecycle of one submitted operation
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SubmissionState {
    Submitted,
    InFlight,
    Completed,
    Failed,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Submitted => write!(f, "submitted"),
            SubmissionState::InFlight => write!(f, "in-flight"),
            SubmissionState::Completed => write!(f, "completed"),
            SubmissionState::Failed => write!(f, "failed"),
        }
    }
}

/// Handle on a submitted operation.
///
/// Dropping it does not cancel the operation.
#[derive(Debug)]
pub struct Submission {
    operation: &'static str,
    state: watch::Receiver<SubmissionState>,
    done: oneshot::Receiver<Result<()>>,
}

impl Submission {
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.borrow()
    }

    /// Wait for completion, bounded by `timeout`
    pub async fn wait(self, timeout: Duration) -> Result<()> {
        self.wait_or_cancel(timeout, &CancellationToken::new()).await
    }

    /// Wait for completion until `timeout` elapses or `cancel` fires.
    ///
    /// Giving up on the wait leaves the operation running.
    pub async fn wait_or_cancel(self, timeout: Duration, cancel: &CancellationToken) -> Result<()> {
        let operation = self.operation;
        tokio::select! {
            outcome = tokio::time::timeout(timeout, self.done) => match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(DataError::Internal(format!(
                    "{} was dropped before completing",
                    operation
                ))),
                Err(_) => Err(DataError::QueryTimeout(timeout.as_millis() as u64)),
            },
            _ = cancel.cancelled() => Err(DataError::Cancelled(operation.to_string())),
        }
    }
}

/// Receives failures of asynchronous operations
pub type ErrorReporter = Arc<dyn Fn(&str, &DataError) + Send + Sync>;

fn log_failure(operation: &str, err: &DataError) {
    error!("Async {} failed: {}", operation, err);
}

/// An operation accepted by [`AsyncManager::submit`]
#[derive(Debug)]
pub enum Operation<Q> {
    Insert(Entity),
    InsertWithTtl(Entity, Duration),
    Update(Entity),
    UpdateWithTtl(Entity, Duration),
    Delete(DeleteQuery),
    Select(SelectQuery),
    Count(String),
    Native(Q),
}

impl<Q> Operation<Q> {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Insert(_) => "insert",
            Operation::InsertWithTtl(..) => "insert-ttl",
            Operation::Update(_) => "update",
            Operation::UpdateWithTtl(..) => "update-ttl",
            Operation::Delete(_) => "delete",
            Operation::Select(_) => "select",
            Operation::Count(_) => "count",
            Operation::Native(_) => "native",
        }
    }
}

/// Successful result of a submitted [`Operation`]
#[derive(Debug)]
pub enum Outcome {
    Entity(Entity),
    Deleted,
    Entities(ResultSet),
    Count(u64),
}

/// Non-blocking façade over a collection manager
pub struct AsyncManager<M> {
    manager: Arc<M>,
    reporter: ErrorReporter,
}

impl<M> Clone for AsyncManager<M> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<M: CollectionManager> AsyncManager<M> {
    pub fn new(manager: Arc<M>) -> Self {
        Self {
            manager,
            reporter: Arc::new(log_failure),
        }
    }

    /// Replace the default reporter, which logs through `tracing`
    pub fn with_error_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&str, &DataError) + Send + Sync + 'static,
    {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn manager(&self) -> &Arc<M> {
        &self.manager
    }

    pub fn insert<C>(&self, entity: Entity, callback: C) -> Result<Submission>
    where
        C: FnOnce(Entity) + Send + 'static,
    {
        self.dispatch("insert", move |m| async move { m.insert(entity).await }, callback)
    }

    /// Rejected before spawning when the backend has no TTL support
    pub fn insert_with_ttl<C>(&self, entity: Entity, ttl: Duration, callback: C) -> Result<Submission>
    where
        C: FnOnce(Entity) + Send + 'static,
    {
        self.manager.ensure_ttl_supported()?;
        self.dispatch(
            "insert-ttl",
            move |m| async move { m.insert_with_ttl(entity, ttl).await },
            callback,
        )
    }

    pub fn update<C>(&self, entity: Entity, callback: C) -> Result<Submission>
    where
        C: FnOnce(Entity) + Send + 'static,
    {
        self.dispatch("update", move |m| async move { m.update(entity).await }, callback)
    }

    /// Rejected before spawning when the backend has no TTL support
    pub fn update_with_ttl<C>(&self, entity: Entity, ttl: Duration, callback: C) -> Result<Submission>
    where
        C: FnOnce(Entity) + Send + 'static,
    {
        self.manager.ensure_ttl_supported()?;
        self.dispatch(
            "update-ttl",
            move |m| async move { m.update_with_ttl(entity, ttl).await },
            callback,
        )
    }

    pub fn delete<C>(&self, query: DeleteQuery, callback: C) -> Result<Submission>
    where
        C: FnOnce(()) + Send + 'static,
    {
        self.dispatch("delete", move |m| async move { m.delete(&query).await }, callback)
    }

    pub fn select<C>(&self, query: SelectQuery, callback: C) -> Result<Submission>
    where
        C: FnOnce(ResultSet) + Send + 'static,
    {
        self.dispatch(
            "select",
            move |m| async move { m.select(&query).await.map(ResultSet::new) },
            callback,
        )
    }

    pub fn count<C>(&self, collection: impl Into<String>, callback: C) -> Result<Submission>
    where
        C: FnOnce(u64) + Send + 'static,
    {
        let collection = collection.into();
        self.dispatch("count", move |m| async move { m.count(&collection).await }, callback)
    }

    pub fn native<C>(&self, query: M::NativeQuery, callback: C) -> Result<Submission>
    where
        C: FnOnce(ResultSet) + Send + 'static,
    {
        self.dispatch(
            "native",
            move |m| async move { m.native(query).await.map(ResultSet::new) },
            callback,
        )
    }

    /// Submit any operation with a single outcome callback
    pub fn submit<C>(&self, operation: Operation<M::NativeQuery>, callback: C) -> Result<Submission>
    where
        C: FnOnce(Outcome) + Send + 'static,
    {
        match operation {
            Operation::Insert(entity) => self.insert(entity, move |e| callback(Outcome::Entity(e))),
            Operation::InsertWithTtl(entity, ttl) => {
                self.insert_with_ttl(entity, ttl, move |e| callback(Outcome::Entity(e)))
            }
            Operation::Update(entity) => self.update(entity, move |e| callback(Outcome::Entity(e))),
            Operation::UpdateWithTtl(entity, ttl) => {
                self.update_with_ttl(entity, ttl, move |e| callback(Outcome::Entity(e)))
            }
            Operation::Delete(query) => self.delete(query, move |_| callback(Outcome::Deleted)),
            Operation::Select(query) => {
                self.select(query, move |rs| callback(Outcome::Entities(rs)))
            }
            Operation::Count(collection) => {
                self.count(collection, move |n| callback(Outcome::Count(n)))
            }
            Operation::Native(query) => {
                self.native(query, move |rs| callback(Outcome::Entities(rs)))
            }
        }
    }

    fn dispatch<T, F, Fut, C>(&self, operation: &'static str, run: F, callback: C) -> Result<Submission>
    where
        T: Send + 'static,
        F: FnOnce(Arc<M>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            DataError::Internal(format!("{} requires a tokio runtime: {}", operation, e))
        })?;

        let (state_tx, state_rx) = watch::channel(SubmissionState::Submitted);
        let (done_tx, done_rx) = oneshot::channel();
        let manager = Arc::clone(&self.manager);
        let reporter = Arc::clone(&self.reporter);

        debug!(
            "Submitting async {} on {}",
            operation,
            self.manager.source_type()
        );

        runtime.spawn(async move {
            state_tx.send_replace(SubmissionState::InFlight);
            let outcome = run(manager).await.and_then(|value| {
                // A panicking callback fails the submission instead of unwinding the task
                panic::catch_unwind(AssertUnwindSafe(|| callback(value))).map_err(|_| {
                    DataError::Internal(format!("{} callback panicked", operation))
                })
            });
            match outcome {
                Ok(()) => {
                    state_tx.send_replace(SubmissionState::Completed);
                    let _ = done_tx.send(Ok(()));
                }
                Err(err) => {
                    (*reporter)(operation, &err);
                    state_tx.send_replace(SubmissionState::Failed);
                    let _ = done_tx.send(Err(err));
                }
            }
        });

        Ok(Submission {
            operation,
            state: state_rx,
            done: done_rx,
        })
    }
}
