//! Document persistence.
//!
//! The mail pipeline only needs a narrow slice of the document store: load an
//! invoice or quote (with its recipient and creator populated where the
//! backend can), look up a client, lead or user by id, read the company settings, and write the
//! delivery-tracking fields back after a send.

mod in_memory;
#[cfg(feature = "postgres")]
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use docmail_core::{DocumentId, PartyId, UserId};
use docmail_documents::{
    CompanySettings, Creator, DeliveryTracking, Invoice, Quote, Recipient,
};

pub use in_memory::InMemoryDocumentStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresDocumentStore;

/// Document store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the query.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored record could not be decoded into its domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// A write targeted a record that no longer exists.
    #[error("record not found: {0}")]
    Missing(String),
}

/// Read access to documents and parties, plus the delivery-tracking write.
///
/// `find_*` return `Ok(None)` for absent (or removed) records; errors are
/// reserved for backend failures.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load an invoice with its client and creator resolved when possible.
    async fn find_invoice(&self, id: DocumentId) -> Result<Option<Invoice>, StoreError>;

    /// Load a quote with its lead, client and creator resolved when possible.
    async fn find_quote(&self, id: DocumentId) -> Result<Option<Quote>, StoreError>;

    async fn find_client(&self, id: PartyId) -> Result<Option<Recipient>, StoreError>;

    async fn find_lead(&self, id: PartyId) -> Result<Option<Recipient>, StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<Creator>, StoreError>;

    /// The singleton company profile, if one has been saved.
    async fn company_settings(&self) -> Result<Option<CompanySettings>, StoreError>;

    /// Overwrite the delivery-tracking fields of an invoice.
    async fn record_invoice_delivery(
        &self,
        id: DocumentId,
        delivery: &DeliveryTracking,
    ) -> Result<(), StoreError>;

    /// Overwrite the delivery-tracking fields of a quote.
    async fn record_quote_delivery(
        &self,
        id: DocumentId,
        delivery: &DeliveryTracking,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn find_invoice(&self, id: DocumentId) -> Result<Option<Invoice>, StoreError> {
        (**self).find_invoice(id).await
    }

    async fn find_quote(&self, id: DocumentId) -> Result<Option<Quote>, StoreError> {
        (**self).find_quote(id).await
    }

    async fn find_client(&self, id: PartyId) -> Result<Option<Recipient>, StoreError> {
        (**self).find_client(id).await
    }

    async fn find_lead(&self, id: PartyId) -> Result<Option<Recipient>, StoreError> {
        (**self).find_lead(id).await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<Creator>, StoreError> {
        (**self).find_user(id).await
    }

    async fn company_settings(&self) -> Result<Option<CompanySettings>, StoreError> {
        (**self).company_settings().await
    }

    async fn record_invoice_delivery(
        &self,
        id: DocumentId,
        delivery: &DeliveryTracking,
    ) -> Result<(), StoreError> {
        (**self).record_invoice_delivery(id, delivery).await
    }

    async fn record_quote_delivery(
        &self,
        id: DocumentId,
        delivery: &DeliveryTracking,
    ) -> Result<(), StoreError> {
        (**self).record_quote_delivery(id, delivery).await
    }
}
