//! Blocking HTTP transport.

use super::{MailError, MailReceipt, MailRequest, MailTransport};
use crate::config::MailConfig;
use log::{debug, warn};
use reqwest::blocking::Client;
use std::time::{Duration, Instant};

/// Posts `MailRequest` JSON to a configured endpoint.
pub struct HttpMailTransport {
    client: Client,
    endpoint: String,
}

impl HttpMailTransport {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl MailTransport for HttpMailTransport {
    fn send(&self, request: &MailRequest) -> Result<MailReceipt, MailError> {
        let started_at = Instant::now();
        let response = self.client.post(&self.endpoint).json(request).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            warn!(
                "event=mail_send module=mail status=error http_status={} duration_ms={}",
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(MailError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let receipt = serde_json::from_str::<MailReceipt>(&body)?;
        debug!(
            "event=mail_send module=mail status=ok http_status={} duration_ms={}",
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        Ok(receipt)
    }
}
