//! Mail composition for business documents.
//!
//! Everything here is a pure function of the document, the company settings
//! and the clock: subject lines, the HTML body, and the outgoing message
//! (sender, recipient, PDF attachment). Sending is someone else's job.

pub mod branding;
pub mod compose;
pub mod format;
pub mod message;
pub mod subject;

pub use branding::{Branding, PaymentInstructions};
pub use compose::{ComposeError, ComposedEmail, MailComposer};
pub use format::{format_date, format_inr, format_optional_date};
pub use message::{MailAttachment, OutgoingMail, SenderIdentity};
pub use subject::{SubjectKind, subject_line};
