//! Message composition — the texts recipients and devices receive.
//!
//! Every function here is total: missing fields render as empty
//! substitutions, never as errors. A formatting defect must not block a
//! dispatch.

use sirenhub_core::types::AlertEvent;

/// Help-request SMS for a matched contact.
pub fn contact_message(event: &AlertEvent) -> String {
    format!(
        "{}, need your help for {}. Contact on {}.",
        event.sender_name, event.alert_type_name, event.sender_phone
    )
}

/// Contact message with a Google Maps directions link to the alert location
/// inserted before the callback sentence.
pub fn contact_message_with_directions(event: &AlertEvent) -> String {
    format!(
        "{}, need your help for {}. {} Contact on {}.",
        event.sender_name,
        event.alert_type_name,
        directions_link(event.latitude, event.longitude),
        event.sender_phone
    )
}

/// Acceptance SMS sent back to the alert sender on a status/remarks update.
pub fn acceptance_message(institute_name: &str, alert_type_name: &str) -> String {
    format!("{institute_name} accepted help for your {alert_type_name}")
}

/// Relay switch command understood by buzzer firmware. The trailing `#` is
/// part of the wire contract.
pub fn relay_command(on: bool) -> &'static str {
    if on { "RELAY,1#" } else { "RELAY,0#" }
}

/// Directions URL to the alert location.
pub fn directions_link(lat: f64, lon: f64) -> String {
    format!("https://www.google.com/maps/dir/?api=1&destination={lat},{lon}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sirenhub_core::types::AlertKind;

    fn event() -> AlertEvent {
        AlertEvent {
            alert_id: 1,
            institute_id: 7,
            institute_name: "City Hospital".into(),
            alert_type_id: 3,
            alert_type_name: "Fire".into(),
            latitude: 27.70,
            longitude: 85.32,
            sender_name: "Ram".into(),
            sender_phone: "9841000001".into(),
            kind: AlertKind::Created,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn test_contact_message() {
        assert_eq!(
            contact_message(&event()),
            "Ram, need your help for Fire. Contact on 9841000001."
        );
    }

    #[test]
    fn test_contact_message_empty_fields() {
        let mut e = event();
        e.sender_name.clear();
        e.alert_type_name.clear();
        // Empty substitutions, never a panic.
        assert_eq!(contact_message(&e), ", need your help for . Contact on 9841000001.");
    }

    #[test]
    fn test_contact_message_with_directions() {
        let msg = contact_message_with_directions(&event());
        assert!(msg.starts_with("Ram, need your help for Fire. "));
        assert!(msg.contains("https://www.google.com/maps/dir/?api=1&destination=27.7,85.32"));
        assert!(msg.ends_with("Contact on 9841000001."));
    }

    #[test]
    fn test_acceptance_message() {
        assert_eq!(
            acceptance_message("City Hospital", "Fire"),
            "City Hospital accepted help for your Fire"
        );
    }

    #[test]
    fn test_relay_command_exact_bytes() {
        assert_eq!(relay_command(true), "RELAY,1#");
        assert_eq!(relay_command(false), "RELAY,0#");
    }
}
