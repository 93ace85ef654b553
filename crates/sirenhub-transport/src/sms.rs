//! SMS gateway client.
//!
//! Thin HTTP wrapper over the provider's GET API. The gateway answers with a
//! plain-text body: `SMS-SHOOT-ID/...` on success, `ERR:...` on a provider
//! error. Every failure mode — timeout, connection error, unexpected status,
//! unexpected body — comes back as a failed `SendReceipt`, never as an `Err`.

use async_trait::async_trait;
use sirenhub_core::config::SmsConfig;
use sirenhub_core::traits::Transport;
use sirenhub_core::types::SendReceipt;

/// HTTP client for the SMS provider.
pub struct SmsGateway {
    config: SmsConfig,
    client: reqwest::Client,
}

impl SmsGateway {
    pub fn new(config: SmsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Classify the gateway's plain-text response body.
    fn classify(status_ok: bool, body: &str) -> SendReceipt {
        if !status_ok {
            return SendReceipt::failed(format!("SMS API returned non-success status: {body}"));
        }
        let body = body.trim();
        if body.contains("SMS-SHOOT-ID") {
            SendReceipt::ok(body)
        } else if body.contains("ERR:") {
            SendReceipt::failed(format!("SMS service error: {body}"))
        } else {
            SendReceipt::failed(format!("Unexpected response from SMS service: {body}"))
        }
    }
}

#[async_trait]
impl Transport for SmsGateway {
    async fn send(&self, phone: &str, message: &str) -> SendReceipt {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("campaign", self.config.campaign_id.as_str()),
                ("routeid", self.config.route_id.as_str()),
                ("type", "text"),
                ("contacts", phone),
                ("senderid", self.config.sender_id.as_str()),
                ("msg", message),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                tracing::warn!("⚠️ SMS timeout for {phone}");
                return SendReceipt::failed("SMS service timeout");
            }
            Err(e) => {
                tracing::warn!("⚠️ SMS connection error for {phone}: {e}");
                return SendReceipt::failed(format!("SMS connection error: {e}"));
            }
        };

        let status_ok = response.status().is_success();
        let body = response.text().await.unwrap_or_default();
        let receipt = Self::classify(status_ok, &body);

        if receipt.success {
            tracing::debug!("SMS sent to {phone}");
        } else {
            tracing::warn!("⚠️ SMS send failed for {phone}: {:?}", receipt.error);
        }
        receipt
    }
}
