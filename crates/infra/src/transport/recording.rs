use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use docmail_mailer::OutgoingMail;

use super::{DeliveryReceipt, MailTransport, TransportError};

/// Keeps every accepted message in memory. Intended for tests/dev.
///
/// Built with [`RecordingTransport::failing`], it rejects every message
/// instead and records nothing.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    failure: Option<String>,
    counter: AtomicU64,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt, TransportError> {
        if let Some(reason) = &self.failure {
            return Err(TransportError::Rejected(reason.clone()));
        }
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.sent
            .lock()
            .map_err(|_| TransportError::Rejected("outbox lock poisoned".to_string()))?
            .push(mail.clone());
        Ok(DeliveryReceipt {
            message_id: format!("<recorded-{n}@localhost>"),
        })
    }
}
