//! Supervised spawning for loops and fire-and-forget units.
//!
//! Every loop and every per-item unit (a catch attempt, an evolve call, a
//! discarded stack) is spawned through a [`TaskSupervisor`]. Nothing is
//! retried and no caller waits on a unit, but a unit that returns an
//! error or panics is reported as a [`TaskFailure`] on a channel drained
//! by the [`FailureCollector`], so failures show up in the log instead of
//! disappearing with the task.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::warn;

use crate::error::BotError;

/// What kind of work a supervised task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// The fort farming loop.
    FarmLoop,
    /// The duplicate transfer loop.
    TransferLoop,
    /// The evolution loop.
    EvolveLoop,
    /// The item recycling loop.
    RecycleLoop,
    /// The nearby-sighting scan run on each walk step.
    NearbyScan,
    /// One encounter-and-capture attempt.
    Catch,
    /// One evolve call.
    Evolve,
    /// One discarded item stack.
    Recycle,
}

/// A supervised task that ended with an error.
#[derive(Debug)]
pub struct TaskFailure {
    /// Kind of the failed task.
    pub kind: TaskKind,
    /// Human-readable label (species, creature id, item kind).
    pub label: String,
    /// Why it failed.
    pub error: BotError,
}

/// Handle to a supervised task.
///
/// Dropping it does not stop the task.
#[derive(Debug)]
pub struct TaskHandle {
    work: AbortHandle,
    done: JoinHandle<()>,
}

impl TaskHandle {
    /// Abort the task. In-flight collaborator calls are dropped.
    pub fn abort(&self) {
        self.work.abort();
    }

    /// Whether the task has ended (normally, with an error, or aborted).
    pub fn is_finished(&self) -> bool {
        self.done.is_finished()
    }

    /// Wait for the task to end and its failure, if any, to be reported.
    pub async fn finished(self) {
        let _ = self.done.await;
    }
}

/// Spawns tasks and forwards their failures to a [`FailureCollector`].
#[derive(Debug, Clone)]
pub struct TaskSupervisor {
    failures: mpsc::UnboundedSender<TaskFailure>,
}

impl TaskSupervisor {
    /// Create a supervisor and the collector that receives its failures.
    pub fn new() -> (Self, FailureCollector) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self { failures: tx },
            FailureCollector {
                receiver: rx,
                total: 0,
            },
        )
    }

    /// Spawn `work` onto the runtime under supervision.
    pub fn spawn<F>(&self, kind: TaskKind, label: impl Into<String>, work: F) -> TaskHandle
    where
        F: Future<Output = Result<(), BotError>> + Send + 'static,
    {
        let label = label.into();
        let failures = self.failures.clone();
        let inner = tokio::spawn(work);
        let abort = inner.abort_handle();
        let done = tokio::spawn(async move {
            let error = match inner.await {
                Ok(Ok(())) => return,
                Ok(Err(error)) => error,
                Err(join_err) if join_err.is_panic() => BotError::Panicked {
                    message: join_err.to_string(),
                },
                // Aborted on purpose.
                Err(_) => return,
            };
            let _ = failures.send(TaskFailure { kind, label, error });
        });
        TaskHandle { work: abort, done }
    }

    /// Report a failure that happened outside a spawned task.
    pub fn report(&self, kind: TaskKind, label: impl Into<String>, error: BotError) {
        let _ = self.failures.send(TaskFailure {
            kind,
            label: label.into(),
            error,
        });
    }
}

/// Receives and logs failures from every supervised task.
#[derive(Debug)]
pub struct FailureCollector {
    receiver: mpsc::UnboundedReceiver<TaskFailure>,
    total: u64,
}

impl FailureCollector {
    /// Receive the next failure, logging it.
    ///
    /// Returns `None` once every supervisor clone has been dropped.
    pub async fn next(&mut self) -> Option<TaskFailure> {
        let failure = self.receiver.recv().await?;
        self.total = self.total.saturating_add(1);
        warn!(
            task = ?failure.kind,
            label = failure.label,
            error = %failure.error,
            total_failures = self.total,
            "supervised task failed"
        );
        Some(failure)
    }

    /// Drain and log failures until every supervisor is gone.
    pub async fn run(mut self) -> u64 {
        while self.next().await.is_some() {}
        self.total
    }

    /// Failures received so far.
    pub const fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::ClientError;

    #[tokio::test]
    async fn successful_task_reports_nothing() {
        let (supervisor, mut collector) = TaskSupervisor::new();
        supervisor
            .spawn(TaskKind::Evolve, "ok", async { Ok(()) })
            .finished()
            .await;
        drop(supervisor);
        assert!(collector.next().await.is_none());
        assert_eq!(collector.total(), 0);
    }

    #[tokio::test]
    async fn error_is_forwarded_with_label() {
        let (supervisor, mut collector) = TaskSupervisor::new();
        supervisor.spawn(TaskKind::Recycle, "Potion", async {
            Err(BotError::from(ClientError::Rejected {
                message: "bag locked".to_owned(),
            }))
        });
        let failure = collector.next().await.unwrap();
        assert_eq!(failure.kind, TaskKind::Recycle);
        assert_eq!(failure.label, "Potion");
        assert!(matches!(failure.error, BotError::Client { .. }));
        assert_eq!(collector.total(), 1);
    }

    #[tokio::test]
    async fn panic_is_reported() {
        let (supervisor, mut collector) = TaskSupervisor::new();
        supervisor.spawn(TaskKind::Catch, "pidgey", async { panic!("boom") });
        let failure = collector.next().await.unwrap();
        assert!(matches!(failure.error, BotError::Panicked { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn abort_is_not_a_failure() {
        let (supervisor, mut collector) = TaskSupervisor::new();
        let handle = supervisor.spawn(TaskKind::FarmLoop, "farm", async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        });
        handle.abort();
        handle.finished().await;
        drop(supervisor);
        assert!(collector.next().await.is_none());
    }

    #[tokio::test]
    async fn run_counts_all_failures() {
        let (supervisor, collector) = TaskSupervisor::new();
        supervisor.report(
            TaskKind::NearbyScan,
            "step",
            BotError::NearbyTimeout { timeout_ms: 10 },
        );
        supervisor.report(
            TaskKind::NearbyScan,
            "step",
            BotError::NearbyTimeout { timeout_ms: 10 },
        );
        drop(supervisor);
        assert_eq!(collector.run().await, 2);
    }
}
