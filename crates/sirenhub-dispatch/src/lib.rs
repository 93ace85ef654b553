//! # SirenHub Dispatch
//! The reaction path from alert event to notified recipients.
//!
//! ## Architecture
//! ```text
//! AlertSource (spool, DB hook, ...)
//!   └── AlertTrigger — dedupe, offload
//!         └── Dispatcher
//!               ├── resolver — institute + geofence + type filters
//!               │     └── geo — ray-cast point-in-polygon
//!               ├── compose — contact / acceptance / relay texts
//!               ├── Transport::send per recipient (isolated, fanned out)
//!               └── RelayScheduler — delayed relay-off tasks
//! ```

pub mod compose;
pub mod coordinator;
pub mod geo;
pub mod resolver;
pub mod trigger;

pub use coordinator::Dispatcher;
pub use trigger::AlertTrigger;
