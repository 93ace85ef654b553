//! Trait seams to the outside world.
//!
//! The dispatch engine owns none of its collaborators: message delivery,
//! contact/device storage, durable task queueing, and the alert event feed
//! all arrive through these object-safe contracts so every one of them can
//! be swapped in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AlertEvent, BuzzerDevice, DispatchTask, RecipientContact, SendReceipt};

/// Message delivery to a phone number. Stateless and safe for concurrent use.
///
/// Implementations must convert every failure mode (timeout, connection
/// error, provider-reported error) into a failed `SendReceipt` — a send
/// never panics and never returns an `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, phone: &str, message: &str) -> SendReceipt;
}

/// Read-only query for alert contacts of one institute.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn list_contacts(&self, institute_id: i64) -> Result<Vec<RecipientContact>>;
}

/// Read-only query for buzzer devices of one institute.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn list_buzzers(&self, institute_id: i64) -> Result<Vec<BuzzerDevice>>;
}

/// Durable work queue for deferred dispatch tasks.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Persist a task; it must survive process restarts.
    async fn enqueue(&self, task: DispatchTask) -> Result<()>;

    /// Claim every task whose deadline has passed. Claimed tasks are removed
    /// from the queue before execution — at-most-once semantics.
    async fn claim_ready(&self) -> Result<Vec<DispatchTask>>;

    /// Whether the queue is usable right now. Checked at startup to pick the
    /// scheduling strategy.
    async fn healthcheck(&self) -> bool;
}

/// Push-based feed of alert lifecycle events.
///
/// Delivery may be at-least-once; the trigger deduplicates downstream.
#[async_trait]
pub trait AlertSource: Send {
    /// Next event, or `None` when the source is exhausted/shut down.
    async fn recv(&mut self) -> Option<AlertEvent>;
}
