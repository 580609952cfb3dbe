use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use docmail_core::{DocumentId, PartyId, UserId};
use docmail_documents::{
    CompanySettings, Creator, DeliveryTracking, Invoice, Quote, Recipient, RecipientKind,
    Relation,
};

use super::{DocumentStore, StoreError};

/// In-memory document store.
///
/// Intended for tests/dev. Loading a document resolves references that point
/// at a known client, lead or user, the way a populated query would; stored
/// resolved relations are returned as they were inserted.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    invoices: RwLock<HashMap<DocumentId, Invoice>>,
    quotes: RwLock<HashMap<DocumentId, Quote>>,
    clients: RwLock<HashMap<PartyId, Recipient>>,
    leads: RwLock<HashMap<PartyId, Recipient>>,
    users: RwLock<HashMap<UserId, Creator>>,
    settings: RwLock<Option<CompanySettings>>,
}

fn poisoned(what: &str) -> StoreError {
    StoreError::Backend(format!("{what} lock poisoned"))
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_invoice(&self, invoice: Invoice) {
        if let Ok(mut map) = self.invoices.write() {
            map.insert(invoice.id, invoice);
        }
    }

    pub fn insert_quote(&self, quote: Quote) {
        if let Ok(mut map) = self.quotes.write() {
            map.insert(quote.id, quote);
        }
    }

    /// Insert a client or lead, keyed into the directory matching its kind.
    pub fn insert_recipient(&self, recipient: Recipient) {
        let directory = match recipient.kind {
            RecipientKind::Client => &self.clients,
            RecipientKind::Lead => &self.leads,
        };
        if let Ok(mut map) = directory.write() {
            map.insert(recipient.id, recipient);
        }
    }

    pub fn insert_user(&self, user: Creator) {
        if let Ok(mut map) = self.users.write() {
            map.insert(user.id, user);
        }
    }

    pub fn set_company_settings(&self, settings: CompanySettings) {
        if let Ok(mut slot) = self.settings.write() {
            *slot = Some(settings);
        }
    }

    /// Current stored state of an invoice, without population.
    pub fn invoice(&self, id: DocumentId) -> Option<Invoice> {
        self.invoices.read().ok()?.get(&id).cloned()
    }

    /// Current stored state of a quote, without population.
    pub fn quote(&self, id: DocumentId) -> Option<Quote> {
        self.quotes.read().ok()?.get(&id).cloned()
    }

    fn populate(
        &self,
        relation: &mut Option<Relation<PartyId, Recipient>>,
        kind: RecipientKind,
    ) -> Result<(), StoreError> {
        let Some(Relation::Reference(id)) = relation.as_ref() else {
            return Ok(());
        };
        let directory = match kind {
            RecipientKind::Client => &self.clients,
            RecipientKind::Lead => &self.leads,
        };
        let map = directory.read().map_err(|_| poisoned(kind.as_str()))?;
        if let Some(found) = map.get(id) {
            *relation = Some(Relation::Resolved(found.clone()));
        }
        Ok(())
    }

    fn populate_creator(
        &self,
        relation: &mut Option<Relation<UserId, Creator>>,
    ) -> Result<(), StoreError> {
        let Some(Relation::Reference(id)) = relation.as_ref() else {
            return Ok(());
        };
        let map = self.users.read().map_err(|_| poisoned("user"))?;
        if let Some(found) = map.get(id) {
            *relation = Some(Relation::Resolved(found.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_invoice(&self, id: DocumentId) -> Result<Option<Invoice>, StoreError> {
        let found = self
            .invoices
            .read()
            .map_err(|_| poisoned("invoice"))?
            .get(&id)
            .cloned();
        let Some(mut invoice) = found else {
            return Ok(None);
        };
        self.populate(&mut invoice.client, RecipientKind::Client)?;
        self.populate_creator(&mut invoice.created_by)?;
        Ok(Some(invoice))
    }

    async fn find_quote(&self, id: DocumentId) -> Result<Option<Quote>, StoreError> {
        let found = self
            .quotes
            .read()
            .map_err(|_| poisoned("quote"))?
            .get(&id)
            .cloned();
        let Some(mut quote) = found else {
            return Ok(None);
        };
        self.populate(&mut quote.lead, RecipientKind::Lead)?;
        self.populate(&mut quote.client, RecipientKind::Client)?;
        self.populate_creator(&mut quote.created_by)?;
        Ok(Some(quote))
    }

    async fn find_client(&self, id: PartyId) -> Result<Option<Recipient>, StoreError> {
        let map = self.clients.read().map_err(|_| poisoned("client"))?;
        Ok(map.get(&id).cloned())
    }

    async fn find_lead(&self, id: PartyId) -> Result<Option<Recipient>, StoreError> {
        let map = self.leads.read().map_err(|_| poisoned("lead"))?;
        Ok(map.get(&id).cloned())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<Creator>, StoreError> {
        let map = self.users.read().map_err(|_| poisoned("user"))?;
        Ok(map.get(&id).cloned())
    }

    async fn company_settings(&self) -> Result<Option<CompanySettings>, StoreError> {
        let slot = self.settings.read().map_err(|_| poisoned("settings"))?;
        Ok(slot.clone())
    }

    async fn record_invoice_delivery(
        &self,
        id: DocumentId,
        delivery: &DeliveryTracking,
    ) -> Result<(), StoreError> {
        let mut map = self.invoices.write().map_err(|_| poisoned("invoice"))?;
        let invoice = map
            .get_mut(&id)
            .ok_or_else(|| StoreError::Missing(format!("invoice {id}")))?;
        invoice.delivery = delivery.clone();
        Ok(())
    }

    async fn record_quote_delivery(
        &self,
        id: DocumentId,
        delivery: &DeliveryTracking,
    ) -> Result<(), StoreError> {
        let mut map = self.quotes.write().map_err(|_| poisoned("quote"))?;
        let quote = map
            .get_mut(&id)
            .ok_or_else(|| StoreError::Missing(format!("quote {id}")))?;
        quote.delivery = delivery.clone();
        Ok(())
    }
}
