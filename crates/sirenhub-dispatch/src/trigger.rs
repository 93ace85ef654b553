//! Alert event trigger — the bridge from the event source to the dispatcher.
//!
//! The source may redeliver (at-least-once); a bounded ring of recently seen
//! `(alert_id, kind, occurred_at)` keys absorbs duplicates. Best-effort
//! only — the ring forgets the oldest keys, it is not an exactly-once log.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use sirenhub_core::traits::AlertSource;
use sirenhub_core::types::{AlertEvent, AlertKind};

use crate::coordinator::Dispatcher;

/// How many dedupe keys are remembered before the oldest is dropped.
const DEDUPE_CAPACITY: usize = 256;

/// Subscribes to alert lifecycle events and fires the dispatcher exactly
/// once per fresh event.
pub struct AlertTrigger {
    dispatcher: Arc<Dispatcher>,
    seen: HashSet<(i64, AlertKind, DateTime<Utc>)>,
    order: VecDeque<(i64, AlertKind, DateTime<Utc>)>,
}

impl AlertTrigger {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            seen: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    /// Handle one observed event. Returns false when the event is a
    /// duplicate and was dropped. Dispatch work is offloaded to a spawned
    /// task so the event producer is never blocked on sends.
    pub fn observe(&mut self, event: AlertEvent) -> bool {
        let key = event.dedupe_key();
        if !self.seen.insert(key) {
            tracing::debug!(
                "Duplicate delivery of alert {} ({:?}) ignored",
                event.alert_id, event.kind
            );
            return false;
        }
        self.order.push_back(key);
        if self.order.len() > DEDUPE_CAPACITY
            && let Some(oldest) = self.order.pop_front()
        {
            self.seen.remove(&oldest);
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            if let Err(e) = dispatcher.dispatch(&event).await {
                // Resolution failed — the event is lost unless the source
                // replays it later.
                tracing::error!("Dispatch of alert {} failed: {e}", event.alert_id);
            }
        });
        true
    }

    /// Consume a source until it closes.
    pub async fn run(mut self, mut source: impl AlertSource) {
        tracing::info!("🔔 Alert trigger listening");
        while let Some(event) = source.recv().await {
            self.observe(event);
        }
        tracing::info!("Alert source closed, trigger stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sirenhub_core::error::Result;
    use sirenhub_core::types::{BuzzerDevice, RecipientContact};
    use sirenhub_core::traits::{ContactStore, DeviceStore};
    use sirenhub_scheduler::RelayScheduler;
    use sirenhub_transport::RecordingTransport;

    struct OneContact;
    struct NoBuzzers;

    #[async_trait]
    impl ContactStore for OneContact {
        async fn list_contacts(&self, _institute_id: i64) -> Result<Vec<RecipientContact>> {
            Ok(vec![RecipientContact {
                institute_id: 7,
                name: "Sita".into(),
                phone: "9800000001".into(),
                sms_enabled: true,
                geofences: vec![],
                alert_types: vec![],
            }])
        }
    }

    #[async_trait]
    impl DeviceStore for NoBuzzers {
        async fn list_buzzers(&self, _institute_id: i64) -> Result<Vec<BuzzerDevice>> {
            Ok(vec![])
        }
    }

    fn trigger(transport: Arc<RecordingTransport>) -> AlertTrigger {
        let dispatcher = Dispatcher::new(
            transport.clone(),
            Arc::new(OneContact),
            Arc::new(NoBuzzers),
            RelayScheduler::in_process(transport),
        );
        AlertTrigger::new(Arc::new(dispatcher))
    }

    fn event() -> AlertEvent {
        AlertEvent {
            alert_id: 5,
            institute_id: 7,
            institute_name: "City Hospital".into(),
            alert_type_id: 3,
            alert_type_name: "Fire".into(),
            latitude: 27.70,
            longitude: 85.32,
            sender_name: "Ram".into(),
            sender_phone: "9841000001".into(),
            kind: AlertKind::Created,
            occurred_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_replayed_event_dispatches_once() {
        let transport = Arc::new(RecordingTransport::new());
        let mut trigger = trigger(transport.clone());

        let e = event();
        assert!(trigger.observe(e.clone()));
        assert!(!trigger.observe(e));

        // Let the single spawned dispatch finish.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(transport.sent_to("9800000001").len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_kinds_both_fire() {
        let transport = Arc::new(RecordingTransport::new());
        let mut trigger = trigger(transport.clone());

        let created = event();
        let mut updated = created.clone();
        updated.kind = AlertKind::StatusOrRemarksUpdated;

        assert!(trigger.observe(created));
        assert!(trigger.observe(updated));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        // One contact message + one acceptance message.
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_ring_forgets_oldest_keys() {
        let transport = Arc::new(RecordingTransport::new());
        let mut trigger = trigger(transport);

        let mut first = event();
        first.alert_id = 0;
        assert!(trigger.observe(first.clone()));

        for i in 1..=DEDUPE_CAPACITY as i64 {
            let mut e = event();
            e.alert_id = i;
            trigger.observe(e);
        }

        // The very first key has been evicted, so a replay passes again.
        assert!(trigger.observe(first));
    }
}
