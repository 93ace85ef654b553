//! In-memory transport for tests and dry runs.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use sirenhub_core::traits::Transport;
use sirenhub_core::types::SendReceipt;

/// Records every send; can be told to fail for specific phone numbers.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `phone` report failure.
    pub fn fail_for(&self, phone: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(phone.to_string());
        }
    }

    /// Snapshot of all `(phone, message)` pairs attempted so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Messages attempted to one phone number.
    pub fn sent_to(&self, phone: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(p, _)| p == phone)
            .map(|(_, m)| m)
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, phone: &str, message: &str) -> SendReceipt {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((phone.to_string(), message.to_string()));
        }
        let should_fail = self
            .failing
            .lock()
            .map(|f| f.contains(phone))
            .unwrap_or(false);
        if should_fail {
            SendReceipt::failed("injected failure")
        } else {
            SendReceipt::ok(format!("SMS-SHOOT-ID/test/{phone}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_injects_failure() {
        let transport = RecordingTransport::new();
        transport.fail_for("9800000002");

        assert!(transport.send("9800000001", "hello").await.success);
        assert!(!transport.send("9800000002", "hello").await.success);
        assert_eq!(transport.sent().len(), 2);
        assert_eq!(transport.sent_to("9800000002"), vec!["hello".to_string()]);
    }
}
