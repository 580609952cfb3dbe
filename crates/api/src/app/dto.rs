use serde::{Deserialize, Serialize};

use docmail_infra::DeliveryOutcome;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SendMailRequest {
    pub id: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Uniform response body: `{success, result, message[, error]}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub result: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(result: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result),
            message: message.into(),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            result: None,
            message: message.into(),
            error,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailResult {
    pub message_id: String,
    pub recipient: String,
    pub document_id: String,
    pub entity: &'static str,
    pub number: Option<u64>,
}

impl From<&DeliveryOutcome> for MailResult {
    fn from(outcome: &DeliveryOutcome) -> Self {
        Self {
            message_id: outcome.message_id.clone(),
            recipient: outcome.recipient.clone(),
            document_id: outcome.document_id.to_string(),
            entity: outcome.kind.as_str(),
            number: outcome.number,
        }
    }
}

/// `{entity} #{number} sent successfully to {email}`; the id stands in for a missing number.
pub fn success_message(outcome: &DeliveryOutcome) -> String {
    let number = match outcome.number {
        Some(n) => n.to_string(),
        None => outcome.document_id.to_string(),
    };
    format!(
        "{} #{} sent successfully to {}",
        outcome.kind.as_str(),
        number,
        outcome.recipient
    )
}
