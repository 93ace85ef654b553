//! # SirenHub Scheduler
//! Deferred execution of relay shutoff commands.
//!
//! Two strategies behind one handle, picked once at startup:
//! - **Durable**: tasks persist to a SQLite queue and a background worker
//!   executes them on a tokio interval tick — they survive restarts.
//! - **In-process fallback**: a spawned timer fires at the deadline — tasks
//!   die with the process. Used when the queue is unavailable or disabled.
//!
//! Execution is at-most-once: a claimed task that fails its send is logged
//! and dropped, never retried. A missed shutoff only leaves a buzzer
//! sounding longer.

pub mod engine;
pub mod queue;

pub use engine::{RelayScheduler, spawn_worker};
pub use queue::SqliteTaskQueue;
