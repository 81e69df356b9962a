//! Transactional email delivery through an HTTP mail endpoint.
//!
//! # Responsibility
//! - Define the wire shape of one send (`MailRequest`) and its receipt.
//! - Abstract delivery behind `MailTransport` so callers can swap transports.
//!
//! # Invariants
//! - Recipients are sent one at a time, in order.
//! - The first failure stops the batch; no retries are attempted.
//! - Logs carry counts and status codes only, never addresses or bodies.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod http;
pub mod template;

pub use http::HttpMailTransport;

/// JSON body POSTed to the mail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRequest {
    pub to: String,
    pub subject: String,
    pub html_content: String,
    pub sender_id: String,
}

/// Tracking data returned for one accepted send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailReceipt {
    pub tracking_id: String,
    pub pixel_url: String,
}

#[derive(Debug)]
pub enum MailError {
    /// Connection, TLS, or timeout failure.
    Http(reqwest::Error),
    /// Endpoint answered with a non-success status.
    Status { status: u16, body: String },
    /// Endpoint answered 2xx with a body that is not a receipt.
    Decode(serde_json::Error),
    NoRecipients,
}

impl Display for MailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "mail request failed: {err}"),
            Self::Status { status, body } => {
                write!(f, "mail endpoint returned status {status}: {body}")
            }
            Self::Decode(err) => write!(f, "mail endpoint returned an invalid receipt: {err}"),
            Self::NoRecipients => write!(f, "no recipients given"),
        }
    }
}

impl Error for MailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Status { .. } | Self::NoRecipients => None,
        }
    }
}

impl From<reqwest::Error> for MailError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for MailError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

/// Something that can deliver one email.
pub trait MailTransport {
    fn send(&self, request: &MailRequest) -> Result<MailReceipt, MailError>;
}

impl<T: MailTransport + ?Sized> MailTransport for &T {
    fn send(&self, request: &MailRequest) -> Result<MailReceipt, MailError> {
        (**self).send(request)
    }
}

/// Result of one sequential batch: who got the message, and the first failure.
#[derive(Debug)]
pub struct BatchOutcome {
    /// `(recipient, receipt)` in send order.
    pub delivered: Vec<(String, MailReceipt)>,
    /// Recipient whose send failed; nobody after it was attempted.
    pub failure: Option<(String, MailError)>,
}

/// Sends the same message to each recipient in turn, stopping at the first error.
pub fn send_batch<T: MailTransport + ?Sized>(
    transport: &T,
    recipients: &[String],
    subject: &str,
    html_content: &str,
    sender_id: &str,
) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        delivered: Vec::with_capacity(recipients.len()),
        failure: None,
    };
    if recipients.is_empty() {
        outcome.failure = Some((String::new(), MailError::NoRecipients));
        return outcome;
    }

    for recipient in recipients {
        let request = MailRequest {
            to: recipient.clone(),
            subject: subject.to_string(),
            html_content: html_content.to_string(),
            sender_id: sender_id.to_string(),
        };
        match transport.send(&request) {
            Ok(receipt) => outcome.delivered.push((request.to, receipt)),
            Err(err) => {
                warn!(
                    "event=mail_batch module=mail status=error sent={} total={}",
                    outcome.delivered.len(),
                    recipients.len()
                );
                outcome.failure = Some((request.to, err));
                return outcome;
            }
        }
    }

    info!(
        "event=mail_batch module=mail status=ok sent={}",
        outcome.delivered.len()
    );
    outcome
}

/// [`send_batch`] collapsed to every receipt, or the first error.
pub fn send_to_recipients<T: MailTransport + ?Sized>(
    transport: &T,
    recipients: &[String],
    subject: &str,
    html_content: &str,
    sender_id: &str,
) -> Result<Vec<MailReceipt>, MailError> {
    let outcome = send_batch(transport, recipients, subject, html_content, sender_id);
    if let Some((_, err)) = outcome.failure {
        return Err(err);
    }
    Ok(outcome
        .delivered
        .into_iter()
        .map(|(_, receipt)| receipt)
        .collect())
}


#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::{send_batch, send_to_recipients, MailError};

    #[test]
    fn sends_each_recipient_in_order() {
        let transport = FakeTransport::default();
        let recipients = vec!["a@acme.test".to_string(), "b@acme.test".to_string()];

        let receipts =
            send_to_recipients(&transport, &recipients, "Hi", "<p>Hi</p>", "hr").unwrap();

        assert_eq!(receipts.len(), 2);
        let sent = transport.sent.borrow();
        assert_eq!(sent[0].to, "a@acme.test");
        assert_eq!(sent[1].to, "b@acme.test");
        assert_eq!(sent[1].sender_id, "hr");
    }

    #[test]
    fn stops_at_first_failure() {
        let transport = FakeTransport {
            fail_for: vec!["b@acme.test".to_string()],
            ..FakeTransport::default()
        };
        let recipients = vec![
            "a@acme.test".to_string(),
            "b@acme.test".to_string(),
            "c@acme.test".to_string(),
        ];

        let err = send_to_recipients(&transport, &recipients, "Hi", "", "hr").unwrap_err();
        assert!(matches!(err, MailError::Status { status: 502, .. }));
        assert_eq!(transport.sent.borrow().len(), 1);
    }

    #[test]
    fn batch_names_delivered_and_failed_recipients() {
        let transport = FakeTransport {
            fail_for: vec!["b@acme.test".to_string()],
            ..FakeTransport::default()
        };
        let recipients = vec![
            "a@acme.test".to_string(),
            "b@acme.test".to_string(),
            "c@acme.test".to_string(),
        ];

        let outcome = send_batch(&transport, &recipients, "Hi", "", "hr");
        let delivered = outcome
            .delivered
            .iter()
            .map(|(to, receipt)| (to.as_str(), receipt.tracking_id.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(delivered, vec![("a@acme.test", "trk-1")]);
        let (failed, err) = outcome.failure.unwrap();
        assert_eq!(failed, "b@acme.test");
        assert!(matches!(err, MailError::Status { status: 502, .. }));
    }

    #[test]
    fn empty_recipient_list_is_rejected() {
        let err = send_to_recipients(&FakeTransport::default(), &[], "Hi", "", "hr").unwrap_err();
        assert!(matches!(err, MailError::NoRecipients));
    }

    #[test]
    fn request_serializes_with_camel_case_keys() {
        let request = super::MailRequest {
            to: "a@acme.test".to_string(),
            subject: "s".to_string(),
            html_content: "<p/>".to_string(),
            sender_id: "hr".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["htmlContent"], "<p/>");
        assert_eq!(value["senderId"], "hr");
    }
}
