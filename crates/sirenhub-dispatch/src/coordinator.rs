//! Dispatch coordination — the end-to-end reaction to one alert event.
//!
//! Per-recipient failure is isolated: every send resolves to a receipt that
//! is counted, and no receipt can abort the rest of the batch. Only a store
//! failure (no recipients determinable) escalates out of `dispatch`.

use std::sync::Arc;

use chrono::{Duration, Utc};

use sirenhub_core::error::Result;
use sirenhub_core::traits::{ContactStore, DeviceStore, Transport};
use sirenhub_core::types::{AlertEvent, AlertKind, DispatchReport, DispatchTask};
use sirenhub_scheduler::RelayScheduler;

use crate::{compose, resolver};

/// Orchestrates resolution, composition, sending, and shutoff scheduling.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    contacts: Arc<dyn ContactStore>,
    devices: Arc<dyn DeviceStore>,
    scheduler: RelayScheduler,
    /// Append a directions link to contact messages.
    maps_link: bool,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        contacts: Arc<dyn ContactStore>,
        devices: Arc<dyn DeviceStore>,
        scheduler: RelayScheduler,
    ) -> Self {
        Self { transport, contacts, devices, scheduler, maps_link: false }
    }

    /// Enable the directions link in contact messages.
    pub fn with_maps_link(mut self, enabled: bool) -> Self {
        self.maps_link = enabled;
        self
    }

    /// React to one lifecycle event. Returns the aggregate outcome; partial
    /// send failures are counted, never raised.
    pub async fn dispatch(&self, event: &AlertEvent) -> Result<DispatchReport> {
        match event.kind {
            AlertKind::Created => self.dispatch_created(event).await,
            AlertKind::StatusOrRemarksUpdated => self.dispatch_updated(event).await,
        }
    }

    async fn dispatch_created(&self, event: &AlertEvent) -> Result<DispatchReport> {
        // Store failures escalate: with no candidate lists there is nothing
        // sensible to send.
        let contacts = self.contacts.list_contacts(event.institute_id).await?;
        let buzzers = self.devices.list_buzzers(event.institute_id).await?;

        let matched_contacts = resolver::resolve_contacts(event, &contacts);
        let matched_buzzers = resolver::resolve_buzzers(event, &buzzers);
        tracing::info!(
            "🔔 Alert {}: {} contact(s), {} buzzer(s) matched",
            event.alert_id,
            matched_contacts.len(),
            matched_buzzers.len()
        );

        let mut report = DispatchReport::default();

        let message = if self.maps_link {
            compose::contact_message_with_directions(event)
        } else {
            compose::contact_message(event)
        };

        // Fan the contact sends out concurrently; ordering between
        // recipients is not guaranteed and not needed.
        let sends = matched_contacts.iter().map(|contact| {
            let transport = Arc::clone(&self.transport);
            let message = message.clone();
            async move { (contact, transport.send(&contact.phone, &message).await) }
        });
        for (contact, receipt) in futures::future::join_all(sends).await {
            if !receipt.success {
                tracing::warn!(
                    "⚠️ Contact SMS to {} ({}) failed for alert {}: {:?}",
                    contact.name, contact.phone, event.alert_id, receipt.error
                );
            }
            report.record(&receipt);
        }

        let dispatched_at = Utc::now();
        for buzzer in &matched_buzzers {
            let receipt = self
                .transport
                .send(&buzzer.device_phone, compose::relay_command(true))
                .await;
            if !receipt.success {
                tracing::warn!(
                    "⚠️ Relay ON to buzzer {} ({}) failed for alert {}: {:?}",
                    buzzer.title, buzzer.device_phone, event.alert_id, receipt.error
                );
            }
            report.record(&receipt);

            let shutoff = DispatchTask::relay_off(
                &buzzer.device_phone,
                compose::relay_command(false),
                dispatched_at + Duration::seconds(buzzer.relay_off_delay_secs as i64),
                event.alert_id,
            );
            self.scheduler.schedule(shutoff).await;
            report.scheduled += 1;
        }

        tracing::info!(
            "📣 Alert {} dispatched: {}/{} sends ok, {} shutoff task(s) scheduled",
            event.alert_id, report.succeeded, report.attempted, report.scheduled
        );
        Ok(report)
    }

    async fn dispatch_updated(&self, event: &AlertEvent) -> Result<DispatchReport> {
        let message = compose::acceptance_message(&event.institute_name, &event.alert_type_name);
        let receipt = self.transport.send(&event.sender_phone, &message).await;
        if !receipt.success {
            tracing::warn!(
                "⚠️ Acceptance SMS to {} failed for alert {}: {:?}",
                event.sender_phone, event.alert_id, receipt.error
            );
        }

        let mut report = DispatchReport::default();
        report.record(&receipt);
        Ok(report)
    }
}
