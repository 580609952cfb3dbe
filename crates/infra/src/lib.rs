//! Infrastructure layer: document store, PDF engine, SMTP transport, and the
//! pipeline that ties them together.

pub mod mail_dispatcher;
pub mod render;
pub mod store;
pub mod transport;

pub use mail_dispatcher::{DeliveryError, DeliveryOutcome, DocumentMailer};
pub use render::{ExternalPdfRenderer, PageFormat, PdfRenderer, RenderError, RenderOptions, StaticPdfRenderer};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError};
#[cfg(feature = "postgres")]
pub use store::PostgresDocumentStore;
pub use transport::{
    DeliveryReceipt, MailTransport, RecordingTransport, SmtpConfig, SmtpMailTransport,
    TransportError,
};
