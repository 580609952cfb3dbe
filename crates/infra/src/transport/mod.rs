//! Mail transports.
//!
//! A transport takes a fully addressed [`OutgoingMail`] and hands it to a
//! provider. It does not retry; the first failure is returned to the caller.

mod recording;
mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use docmail_mailer::OutgoingMail;

pub use recording::RecordingTransport;
pub use smtp::{SmtpConfig, SmtpMailTransport};

/// What the provider gave back for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// A sender or recipient address could not be parsed.
    #[error("invalid address {address:?}: {reason}")]
    Address { address: String, reason: String },

    /// The MIME message could not be assembled.
    #[error("could not build message: {0}")]
    Message(String),

    /// The transport could not be configured (TLS parameters, host).
    #[error("invalid transport configuration: {0}")]
    Config(String),

    /// The provider refused the message or could not be reached.
    #[error("{0}")]
    Rejected(String),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt, TransportError>;
}

#[async_trait]
impl<T> MailTransport for Arc<T>
where
    T: MailTransport + ?Sized,
{
    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt, TransportError> {
        (**self).send(mail).await
    }
}
