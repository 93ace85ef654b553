//! # SirenHub Store
//! File-based collaborators: JSON contact/buzzer snapshots and the
//! spool-directory alert source (outbox pattern).
//!
//! These are the reference implementations of the store/source traits —
//! human-readable files, no database required. Deployments with a real
//! contact-management service swap in their own trait impls.

pub mod files;
pub mod spool;

pub use files::{FileContactStore, FileDeviceStore};
pub use spool::SpoolSource;
