use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery-tracking fields stored on a document.
///
/// Only the delivery recorder writes these, and only after a send succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTracking {
    pub emailed: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub email_recipient: Option<String>,
}

impl DeliveryTracking {
    pub fn record(&mut self, recipient: impl Into<String>, sent_at: DateTime<Utc>) {
        self.emailed = true;
        self.email_sent_at = Some(sent_at);
        self.email_recipient = Some(recipient.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sets_every_field() {
        let mut tracking = DeliveryTracking::default();
        let at = Utc::now();
        tracking.record("a@b.com", at);
        assert!(tracking.emailed);
        assert_eq!(tracking.email_sent_at, Some(at));
        assert_eq!(tracking.email_recipient.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn serializes_with_store_field_names() {
        let json = serde_json::to_value(DeliveryTracking::default()).unwrap();
        assert_eq!(json["emailed"], false);
        assert!(json.get("emailSentAt").is_some());
        assert!(json.get("emailRecipient").is_some());
    }
}
