//! Business documents that can be emailed (invoices and quotes) and the
//! records they reference.
//!
//! Plain data plus the few rules the mail pipeline depends on: which party
//! receives a document, when a quote counts as expired, and how delivery is
//! recorded. No IO lives here.

pub mod delivery;
pub mod document;
pub mod invoice;
pub mod kind;
pub mod line_item;
pub mod party;
pub mod quote;
pub mod relation;
pub mod settings;

pub use delivery::DeliveryTracking;
pub use document::{Document, RecipientRef};
pub use invoice::{Invoice, PaymentStatus};
pub use kind::DocumentKind;
pub use line_item::LineItem;
pub use party::{Creator, Recipient, RecipientKind};
pub use quote::{Quote, QuoteStatus};
pub use relation::Relation;
pub use settings::CompanySettings;
