//! Recipient resolution — which contacts and buzzers react to an alert.
//!
//! Pure filtering over read-only snapshots; the stores that own the
//! collections do the I/O, this module only applies the match rules.

use std::collections::HashSet;

use sirenhub_core::types::{AlertEvent, BuzzerDevice, RecipientContact};

use crate::geo::point_in_polygon;

/// Contacts that must be notified for `event`.
///
/// A contact matches when its institute equals the event's, it is SMS
/// enabled, its geofence set is empty or contains the event point, and its
/// alert-type set is empty or contains the event type. The result is
/// deduplicated by phone number.
pub fn resolve_contacts(event: &AlertEvent, contacts: &[RecipientContact]) -> Vec<RecipientContact> {
    let point = event.point();
    let mut seen_phones = HashSet::new();
    contacts
        .iter()
        .filter(|c| c.institute_id == event.institute_id)
        .filter(|c| c.sms_enabled)
        .filter(|c| c.geofences.is_empty() || c.geofences.iter().any(|f| point_in_polygon(f, point)))
        .filter(|c| c.alert_types.is_empty() || c.alert_types.contains(&event.alert_type_id))
        .filter(|c| seen_phones.insert(c.phone.clone()))
        .cloned()
        .collect()
}

/// Buzzers that must sound for `event`: institute match and the event point
/// inside at least one of the buzzer's geofences. Deduplicated by device
/// phone. Buzzers carry no alert-type or opt-in filter.
pub fn resolve_buzzers(event: &AlertEvent, buzzers: &[BuzzerDevice]) -> Vec<BuzzerDevice> {
    let point = event.point();
    let mut seen_phones = HashSet::new();
    buzzers
        .iter()
        .filter(|b| b.institute_id == event.institute_id)
        .filter(|b| b.geofences.iter().any(|f| point_in_polygon(f, point)))
        .filter(|b| seen_phones.insert(b.device_phone.clone()))
        .cloned()
        .collect()
}
