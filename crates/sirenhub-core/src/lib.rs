//! # SirenHub Core
//! Shared data model, trait seams, error taxonomy, and configuration.
//!
//! Everything downstream crates agree on lives here: the alert event
//! snapshot, recipient/buzzer records, the transport and store contracts,
//! and the TOML config loaded at startup.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::SirenConfig;
pub use error::{Result, SirenError};
pub use traits::{AlertSource, ContactStore, DeviceStore, TaskQueue, Transport};
pub use types::{
    AlertEvent, AlertKind, BuzzerDevice, DispatchReport, DispatchTask, GeoPoint, Geofence,
    RecipientContact, SendReceipt,
};
