//! SirenHub error taxonomy.
//!
//! Transport failures are recovered per recipient and never escalate past a
//! single send. Store failures escalate the whole dispatch (no recipients can
//! be determined). Queue failures downgrade scheduling to the in-process
//! fallback. Composition has no error variant on purpose.

use thiserror::Error;

/// All errors produced by SirenHub crates.
#[derive(Error, Debug)]
pub enum SirenError {
    /// SMS gateway or other transport failure (timeout, connection, provider).
    #[error("transport error: {0}")]
    Transport(String),

    /// Contact/buzzer store unreachable or unreadable.
    #[error("store error: {0}")]
    Store(String),

    /// Durable task queue unavailable or rejected an operation.
    #[error("queue error: {0}")]
    Queue(String),

    /// Configuration missing or malformed.
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across SirenHub.
pub type Result<T> = std::result::Result<T, SirenError>;
