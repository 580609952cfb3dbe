//! Document mail pipeline (application-level orchestration).
//!
//! ```text
//! raw id
//!   ↓
//! 1. Validate id (before any store access)
//!   ↓
//! 2. Load document by kind, recipient relation populated where possible
//!   ↓
//! 3. Resolve recipient (fetch by reference when the relation has no email)
//!   ↓
//! 4. Render PDF (non-empty bytes)
//!   ↓
//! 5. Compose subject + HTML body
//!   ↓
//! 6. Send through the transport (no retry)
//!   ↓
//! 7. Record delivery tracking and persist
//! ```
//!
//! Each step either succeeds or ends the request with a `DeliveryError`.
//! Delivery tracking is written only after the transport accepted the
//! message, so a failed render or send leaves the document untouched.
//! Concurrent requests for the same document race on the tracking write;
//! the last one wins.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use docmail_core::{DocumentId, DomainError};
use docmail_documents::{Document, DocumentKind, Recipient, RecipientKind, Relation};
use docmail_mailer::{ComposeError, MailComposer, OutgoingMail, SenderIdentity};

use crate::render::{PdfRenderer, RenderError, RenderOptions};
use crate::store::{DocumentStore, StoreError};
use crate::transport::{MailTransport, TransportError};

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Missing or malformed input, or no usable recipient address.
    #[error("{0}")]
    Validation(String),

    /// No document with the requested id.
    #[error("{} not found", .0.as_str())]
    NotFound(DocumentKind),

    /// Reading the document, recipient or settings failed.
    #[error("failed to load document: {0}")]
    Store(#[source] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to compose email: {0}")]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Dispatch(#[from] TransportError),

    /// The message went out but the tracking write failed.
    #[error("email was sent (message id {message_id}) but delivery status could not be saved: {source}")]
    Persist {
        message_id: String,
        #[source]
        source: StoreError,
    },
}

impl From<DomainError> for DeliveryError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                DeliveryError::Validation(msg)
            }
        }
    }
}

/// What a successful delivery reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub kind: DocumentKind,
    pub document_id: DocumentId,
    pub number: Option<u64>,
    pub recipient: String,
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
}

/// Reusable delivery engine for invoices and quotes.
///
/// Generic over the store, renderer and transport so tests can run the whole
/// pipeline with in-memory doubles.
#[derive(Debug)]
pub struct DocumentMailer<S, R, T> {
    store: S,
    renderer: R,
    transport: T,
    composer: MailComposer,
    sender: SenderIdentity,
}

impl<S, R, T> DocumentMailer<S, R, T> {
    pub fn new(
        store: S,
        renderer: R,
        transport: T,
        composer: MailComposer,
        sender: SenderIdentity,
    ) -> Self {
        Self {
            store,
            renderer,
            transport,
            composer,
            sender,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S, R, T> DocumentMailer<S, R, T>
where
    S: DocumentStore,
    R: PdfRenderer,
    T: MailTransport,
{
    /// Email the document `raw_id` of `kind` to its recipient, as of now.
    pub async fn deliver(
        &self,
        kind: DocumentKind,
        raw_id: Option<&str>,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        self.deliver_at(kind, raw_id, Utc::now()).await
    }

    /// Same as [`deliver`](Self::deliver) with an explicit clock reading,
    /// used for the expiry check and the `emailSentAt` timestamp.
    #[instrument(skip_all, fields(entity = %kind, document_id = ?raw_id), err)]
    pub async fn deliver_at(
        &self,
        kind: DocumentKind,
        raw_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        // 1) Validate
        let id = parse_id(raw_id)?;

        // 2) Load
        let mut document = self
            .load(kind, id)
            .await?
            .ok_or(DeliveryError::NotFound(kind))?;

        // 3) Resolve recipient
        let recipient = self.resolve_recipient(&mut document).await?;
        let settings = self
            .store
            .company_settings()
            .await
            .map_err(DeliveryError::Store)?;

        // 4) Render
        let pdf = self
            .renderer
            .render(&document, &RenderOptions::for_document(&document))
            .await?;
        if pdf.is_empty() {
            return Err(RenderError::Empty.into());
        }

        // 5) Compose
        let composed = self.composer.compose(&document, settings.as_ref(), now)?;
        let from = self.sender.from_header(settings.as_ref());
        let mail = OutgoingMail::for_document(&document, composed, from, recipient.as_str(), pdf);

        // 6) Send
        let receipt = self.transport.send(&mail).await?;
        tracing::info!(
            message_id = %receipt.message_id,
            recipient = %recipient,
            "{} email sent",
            kind.as_str()
        );

        // 7) Record delivery
        document.delivery_mut().record(recipient.clone(), now);
        self.persist(&document)
            .await
            .map_err(|source| DeliveryError::Persist {
                message_id: receipt.message_id.clone(),
                source,
            })?;

        Ok(DeliveryOutcome {
            kind,
            document_id: id,
            number: document.number(),
            recipient,
            message_id: receipt.message_id,
            sent_at: now,
        })
    }

    async fn load(
        &self,
        kind: DocumentKind,
        id: DocumentId,
    ) -> Result<Option<Document>, DeliveryError> {
        let found = match kind {
            DocumentKind::Invoice => self.store.find_invoice(id).await.map(|d| d.map(Document::from)),
            DocumentKind::Quote => self.store.find_quote(id).await.map(|d| d.map(Document::from)),
        };
        found.map_err(DeliveryError::Store)
    }

    /// The recipient's address. When the populated relation carries no usable
    /// email, the record is fetched again by its id and attached.
    async fn resolve_recipient(&self, document: &mut Document) -> Result<String, DeliveryError> {
        if let Some(email) = document.recipient().and_then(Recipient::usable_email) {
            return Ok(email.to_string());
        }

        let missing = missing_email_message(document.kind());
        let Some(target) = document.recipient_ref() else {
            return Err(DeliveryError::Validation(missing.to_string()));
        };
        let party_id = match target.relation {
            Relation::Resolved(recipient) => recipient.id,
            Relation::Reference(id) => *id,
        };
        let fetched = match target.kind {
            RecipientKind::Client => self.store.find_client(party_id).await,
            RecipientKind::Lead => self.store.find_lead(party_id).await,
        }
        .map_err(DeliveryError::Store)?;

        let Some(fetched) = fetched else {
            return Err(DeliveryError::Validation(missing.to_string()));
        };
        let email = fetched.usable_email().map(str::to_string);
        document.attach_recipient(fetched);
        email.ok_or_else(|| DeliveryError::Validation(missing.to_string()))
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        match document {
            Document::Invoice(invoice) => {
                self.store
                    .record_invoice_delivery(invoice.id, &invoice.delivery)
                    .await
            }
            Document::Quote(quote) => {
                self.store
                    .record_quote_delivery(quote.id, &quote.delivery)
                    .await
            }
        }
    }
}

fn parse_id(raw: Option<&str>) -> Result<DocumentId, DeliveryError> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty());
    let Some(raw) = raw else {
        return Err(DomainError::validation("Document ID is required").into());
    };
    Ok(raw.parse::<DocumentId>()?)
}

fn missing_email_message(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Invoice => "Client email not found",
        DocumentKind::Quote => "Client/Lead email not found",
    }
}
