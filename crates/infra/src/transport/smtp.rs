use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::instrument;
use uuid::Uuid;

use docmail_mailer::OutgoingMail;

use super::{DeliveryReceipt, MailTransport, TransportError};

/// SMTP connection settings, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// `true`: implicit TLS from the first byte (usually port 465).
    /// `false`: plain connection upgraded with STARTTLS when the server offers it.
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            secure: false,
            username: None,
            password: None,
        }
    }
}

impl core::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Sends mail through an SMTP relay with lettre.
#[derive(Clone)]
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl core::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl SmtpMailTransport {
    /// Build the transport. No connection is opened until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        let tls_params = TlsParameters::new(config.host.clone())
            .map_err(|e| TransportError::Config(format!("TLS configuration error: {e}")))?;
        let tls = if config.secure {
            Tls::Wrapper(tls_params)
        } else {
            Tls::Opportunistic(tls_params)
        };

        let builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls);
        let builder = match (&config.username, &config.password) {
            (Some(user), Some(password)) => {
                builder.credentials(Credentials::new(user.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address.parse().map_err(|e: lettre::address::AddressError| TransportError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// `<{uuid}@{sender domain}>`, so the id can be reported before the provider answers.
fn message_id_for(from: &Mailbox) -> String {
    format!("<{}@{}>", Uuid::new_v4(), from.email.domain())
}

/// Assemble the MIME message: an HTML part plus one part per attachment.
pub(crate) fn build_message(mail: &OutgoingMail) -> Result<(Message, String), TransportError> {
    let from = parse_mailbox(&mail.from)?;
    let to = parse_mailbox(&mail.to)?;
    let message_id = message_id_for(&from);

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(mail.html.clone()));
    for attachment in &mail.attachments {
        let content_type = ContentType::parse(attachment.content_type)
            .map_err(|e| TransportError::Message(format!("content type: {e}")))?;
        body = body.singlepart(
            Attachment::new(attachment.filename.clone())
                .body(attachment.content.clone(), content_type),
        );
    }

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .message_id(Some(message_id.clone()))
        .multipart(body)
        .map_err(|e| TransportError::Message(e.to_string()))?;

    Ok((message, message_id))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    #[instrument(skip(self, mail), fields(host = %self.host, to = %mail.to), err)]
    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt, TransportError> {
        let (message, message_id) = build_message(mail)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| TransportError::Rejected(e.to_string()))?;

        tracing::info!(
            message_id = %message_id,
            code = %response.code(),
            "smtp accepted message"
        );
        Ok(DeliveryReceipt { message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmail_mailer::MailAttachment;

    fn mail(from: &str, to: &str) -> OutgoingMail {
        OutgoingMail {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Invoice #3 from Acme".to_string(),
            html: "<p>Hello</p>".to_string(),
            attachments: vec![MailAttachment::pdf("invoice-3.pdf", b"%PDF-1.7".to_vec())],
        }
    }

    #[test]
    fn builds_multipart_with_pdf_attachment() {
        let (message, id) = build_message(&mail("\"Acme\" <billing@acme.test>", "asha@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(id.starts_with('<') && id.ends_with("@acme.test>"));
        assert!(raw.contains(&format!("Message-ID: {id}")));
        assert!(raw.contains("Subject: Invoice #3 from Acme"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("Content-Type: application/pdf"));
        assert!(raw.contains("invoice-3.pdf"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn bad_recipient_is_an_address_error() {
        let err = build_message(&mail("billing@acme.test", "not an address")).unwrap_err();
        match err {
            TransportError::Address { address, .. } => assert_eq!(address, "not an address"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn debug_output_hides_the_password() {
        let config = SmtpConfig {
            username: Some("mailer".into()),
            password: Some("hunter2".into()),
            ..SmtpConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }

    #[tokio::test]
    async fn transport_builds_for_both_tls_modes() {
        for secure in [false, true] {
            let config = SmtpConfig {
                host: "smtp.example.com".into(),
                port: if secure { 465 } else { 587 },
                secure,
                ..SmtpConfig::default()
            };
            assert!(SmtpMailTransport::new(&config).is_ok());
        }
    }
}
