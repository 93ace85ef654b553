//! Scheduling engine — strategy selection and task execution.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use sirenhub_core::traits::{TaskQueue, Transport};
use sirenhub_core::types::DispatchTask;

/// How deferred tasks are held until their deadline.
enum Strategy {
    /// Persisted to the durable queue; a worker loop executes them.
    Durable(Arc<dyn TaskQueue>),
    /// Spawned in-process timers; lost if the process dies first.
    InProcess,
}

/// Handle used by the dispatcher to defer relay commands.
pub struct RelayScheduler {
    transport: Arc<dyn Transport>,
    strategy: Strategy,
}

impl RelayScheduler {
    /// Prefer the durable queue; degrade to in-process timers when the
    /// queue fails its startup health check.
    pub async fn with_queue(queue: Arc<dyn TaskQueue>, transport: Arc<dyn Transport>) -> Self {
        if queue.healthcheck().await {
            tracing::info!("⏰ Scheduler using durable queue");
            Self { transport, strategy: Strategy::Durable(queue) }
        } else {
            tracing::warn!("⚠️ Task queue failed health check — degraded to in-process timers");
            Self::in_process(transport)
        }
    }

    /// In-process timers only.
    pub fn in_process(transport: Arc<dyn Transport>) -> Self {
        Self { transport, strategy: Strategy::InProcess }
    }

    /// Whether tasks currently survive a restart.
    pub fn is_durable(&self) -> bool {
        matches!(self.strategy, Strategy::Durable(_))
    }

    /// Accept a task. Never fails the caller: a queue error downgrades this
    /// one task to an in-process timer with a warning.
    pub async fn schedule(&self, task: DispatchTask) {
        match &self.strategy {
            Strategy::Durable(queue) => {
                if let Err(e) = queue.enqueue(task.clone()).await {
                    tracing::warn!("⚠️ Enqueue failed ({e}) — running task {} in-process", task.id);
                    self.spawn_timer(task);
                }
            }
            Strategy::InProcess => self.spawn_timer(task),
        }
    }

    fn spawn_timer(&self, task: DispatchTask) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            let wait = (task.not_before - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
            execute(transport.as_ref(), &task).await;
        });
    }
}

/// Background worker for the durable strategy: claims ready tasks on every
/// tick and executes them. Runs until the handle is dropped/aborted.
pub fn spawn_worker(
    queue: Arc<dyn TaskQueue>,
    transport: Arc<dyn Transport>,
    tick_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("⏰ Queue worker started (tick every {tick_secs}s)");
        let mut interval = tokio::time::interval(Duration::from_secs(tick_secs.max(1)));
        loop {
            interval.tick().await;
            let ready = match queue.claim_ready().await {
                Ok(tasks) => tasks,
                Err(e) => {
                    tracing::warn!("⚠️ Failed to claim ready tasks: {e}");
                    continue;
                }
            };
            // Claimed tasks are independent; run them side by side so one
            // slow gateway call cannot delay the rest of the batch.
            for task in ready {
                let transport = Arc::clone(&transport);
                tokio::spawn(async move {
                    execute(transport.as_ref(), &task).await;
                });
            }
        }
    })
}

/// Run one task to completion. At-most-once: a failed send is logged and
/// the task dropped.
async fn execute(transport: &dyn Transport, task: &DispatchTask) {
    let receipt = transport.send(&task.device_phone, &task.payload).await;
    if receipt.success {
        tracing::info!(
            "✅ Task {} delivered '{}' to {} (alert {})",
            task.id, task.payload, task.device_phone, task.alert_id
        );
    } else {
        tracing::warn!(
            "⚠️ Task {} failed for {} (alert {}): {:?}",
            task.id, task.device_phone, task.alert_id, receipt.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use sirenhub_core::error::{Result, SirenError};
    use sirenhub_transport::RecordingTransport;

    use crate::queue::SqliteTaskQueue;

    struct DeadQueue;

    #[async_trait]
    impl TaskQueue for DeadQueue {
        async fn enqueue(&self, _task: DispatchTask) -> Result<()> {
            Err(SirenError::Queue("unreachable".into()))
        }
        async fn claim_ready(&self) -> Result<Vec<DispatchTask>> {
            Err(SirenError::Queue("unreachable".into()))
        }
        async fn healthcheck(&self) -> bool {
            false
        }
    }

    fn due_task(phone: &str) -> DispatchTask {
        DispatchTask::relay_off(phone, "RELAY,0#", Utc::now() - ChronoDuration::seconds(1), 7)
    }

    #[tokio::test]
    async fn test_durable_schedule_lands_in_queue() {
        let queue = Arc::new(SqliteTaskQueue::open_in_memory().unwrap());
        let transport = Arc::new(RecordingTransport::new());
        let scheduler =
            RelayScheduler::with_queue(queue.clone(), transport.clone()).await;
        assert!(scheduler.is_durable());

        scheduler.schedule(due_task("9811000001")).await;
        assert_eq!(queue.pending_count().await.unwrap(), 1);
        // Nothing sent until the worker runs.
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_worker_executes_ready_tasks() {
        let queue = Arc::new(SqliteTaskQueue::open_in_memory().unwrap());
        let transport = Arc::new(RecordingTransport::new());
        queue.enqueue(due_task("9811000001")).await.unwrap();

        let handle = spawn_worker(queue.clone(), transport.clone(), 1);
        // First tick fires immediately.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(transport.sent_to("9811000001"), vec!["RELAY,0#".to_string()]);
        assert_eq!(queue.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unhealthy_queue_degrades_at_startup() {
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = RelayScheduler::with_queue(Arc::new(DeadQueue), transport.clone()).await;
        assert!(!scheduler.is_durable());
    }

    #[tokio::test]
    async fn test_enqueue_failure_falls_back_to_timer() {
        let transport = Arc::new(RecordingTransport::new());
        // Healthy at startup is irrelevant here: build durable by hand.
        let scheduler = RelayScheduler {
            transport: transport.clone(),
            strategy: Strategy::Durable(Arc::new(DeadQueue)),
        };

        scheduler.schedule(due_task("9811000001")).await;
        // The fallback timer has a past deadline, so it fires right away.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(transport.sent_to("9811000001"), vec!["RELAY,0#".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_process_timer_waits_for_deadline() {
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = RelayScheduler::in_process(transport.clone());

        let task = DispatchTask::relay_off(
            "9811000001",
            "RELAY,0#",
            Utc::now() + ChronoDuration::seconds(60),
            7,
        );
        scheduler.schedule(task).await;
        tokio::task::yield_now().await;
        assert!(transport.sent().is_empty());

        // Jump past the deadline; the timer fires.
        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        assert_eq!(transport.sent_to("9811000001"), vec!["RELAY,0#".to_string()]);
    }
}
