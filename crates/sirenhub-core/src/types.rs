//! Data model — the snapshot types flowing through a dispatch.
//!
//! An `AlertEvent` is captured once per observed lifecycle transition and is
//! never mutated afterwards; everything the dispatch needs (names included)
//! is copied into it so no store lookup happens after trigger time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which lifecycle transition produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A new alert record was created.
    Created,
    /// The alert's status or remarks field changed.
    StatusOrRemarksUpdated,
}

/// Immutable snapshot of an alert at the moment of trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub alert_id: i64,
    pub institute_id: i64,
    /// Institute display name, snapshotted for the acceptance message.
    pub institute_name: String,
    pub alert_type_id: i64,
    /// Alert type display name ("Fire", "Medical", ...).
    pub alert_type_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Display name of the person who raised the alert.
    pub sender_name: String,
    /// Primary phone of the person who raised the alert.
    pub sender_phone: String,
    pub kind: AlertKind,
    pub occurred_at: DateTime<Utc>,
}

impl AlertEvent {
    /// The alert's location as a point.
    pub fn point(&self) -> GeoPoint {
        GeoPoint { lat: self.latitude, lon: self.longitude }
    }

    /// Best-effort dedupe key for redelivered events.
    pub fn dedupe_key(&self) -> (i64, AlertKind, DateTime<Utc>) {
        (self.alert_id, self.kind, self.occurred_at)
    }
}

/// A geographic point (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A simple polygon; closure is implicit (last vertex connects to first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub vertices: Vec<GeoPoint>,
}

impl Geofence {
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self { vertices }
    }
}

/// A contact eligible for SMS notification, owned by the contact-management
/// collaborator and read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientContact {
    pub institute_id: i64,
    pub name: String,
    pub phone: String,
    /// SMS opt-in flag.
    pub sms_enabled: bool,
    /// Coverage areas; empty = unrestricted.
    #[serde(default)]
    pub geofences: Vec<Geofence>,
    /// Alert types this contact cares about; empty = unrestricted.
    #[serde(default)]
    pub alert_types: Vec<i64>,
}

/// A physical buzzer device with a remotely switchable relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuzzerDevice {
    pub institute_id: i64,
    pub title: String,
    /// Phone number of the SIM inside the device.
    pub device_phone: String,
    /// Coverage areas that activate this buzzer.
    #[serde(default)]
    pub geofences: Vec<Geofence>,
    /// Seconds the relay stays on before the scheduled shutoff.
    pub relay_off_delay_secs: u64,
}

/// A deferred unit of work: send `payload` to `device_phone` at or after
/// `not_before`. Owned by the scheduler once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchTask {
    pub id: String,
    pub device_phone: String,
    pub payload: String,
    pub not_before: DateTime<Utc>,
    /// Originating alert, for log correlation only.
    pub alert_id: i64,
}

impl DispatchTask {
    /// Build a relay-shutoff task firing at `not_before`.
    pub fn relay_off(device_phone: &str, payload: &str, not_before: DateTime<Utc>, alert_id: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            device_phone: device_phone.to_string(),
            payload: payload.to_string(),
            not_before,
            alert_id,
        }
    }

    /// Whether the task's deadline has passed.
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        now >= self.not_before
    }
}

/// Outcome of a single transport send. The transport never raises — failure
/// is always expressed through this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReceipt {
    pub success: bool,
    /// Provider-assigned reference, when the gateway returned one.
    pub provider_ref: Option<String>,
    pub error: Option<String>,
}

impl SendReceipt {
    pub fn ok(provider_ref: impl Into<String>) -> Self {
        Self { success: true, provider_ref: Some(provider_ref.into()), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, provider_ref: None, error: Some(error.into()) }
    }
}

/// Aggregate outcome of one dispatch. Partial failure never fails the whole
/// dispatch; it is counted here instead.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Relay-off tasks handed to the scheduler.
    pub scheduled: usize,
}

impl DispatchReport {
    /// Fold a send outcome into the counts.
    pub fn record(&mut self, receipt: &SendReceipt) {
        self.attempted += 1;
        if receipt.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_constructors() {
        let ok = SendReceipt::ok("SMS-SHOOT-ID/123");
        assert!(ok.success);
        assert_eq!(ok.provider_ref.as_deref(), Some("SMS-SHOOT-ID/123"));
        let bad = SendReceipt::failed("timeout");
        assert!(!bad.success);
        assert_eq!(bad.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_report_counts() {
        let mut report = DispatchReport::default();
        report.record(&SendReceipt::ok("x"));
        report.record(&SendReceipt::failed("y"));
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn test_task_readiness() {
        let now = Utc::now();
        let task = DispatchTask::relay_off("9841000000", "RELAY,0#", now + chrono::Duration::seconds(60), 1);
        assert!(!task.is_ready(now));
        assert!(task.is_ready(now + chrono::Duration::seconds(60)));
    }
}
