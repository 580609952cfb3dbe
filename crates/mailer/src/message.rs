//! The transport-neutral outgoing message.

use docmail_documents::{CompanySettings, Document};

use crate::compose::ComposedEmail;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Display name used when neither an explicit sender nor a company name is known.
const DEFAULT_SENDER_NAME: &str = "System";

/// Where outgoing mail claims to come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    /// Full `From:` value that overrides everything else.
    pub explicit_from: Option<String>,
    /// Mailbox address (usually the SMTP login) used with the company name.
    pub address: String,
}

impl SenderIdentity {
    /// `From:` header: the explicit override, else `"{company}" <{address}>`.
    pub fn from_header(&self, settings: Option<&CompanySettings>) -> String {
        if let Some(explicit) = self.explicit_from.as_deref().filter(|f| !f.trim().is_empty()) {
            return explicit.trim().to_string();
        }
        let name = settings
            .and_then(CompanySettings::name)
            .unwrap_or(DEFAULT_SENDER_NAME)
            .replace(['"', '\\'], "");
        format!("\"{}\" <{}>", name, self.address)
    }
}

/// A file attached to an outgoing mail.
#[derive(Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: &'static str,
    pub content: Vec<u8>,
}

impl MailAttachment {
    pub fn pdf(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: PDF_CONTENT_TYPE,
            content,
        }
    }
}

impl core::fmt::Debug for MailAttachment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MailAttachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// A fully addressed message, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<MailAttachment>,
}

impl OutgoingMail {
    /// Address a composed document mail and attach the rendered PDF as
    /// `{entity}-{number-or-id}.pdf`.
    pub fn for_document(
        document: &Document,
        composed: ComposedEmail,
        from: String,
        to: impl Into<String>,
        pdf: Vec<u8>,
    ) -> Self {
        Self {
            from,
            to: to.into(),
            subject: composed.subject,
            html: composed.html,
            attachments: vec![MailAttachment::pdf(document.pdf_filename(), pdf)],
        }
    }
}
