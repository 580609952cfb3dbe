use serde::Serialize;

use docmail_core::{DocumentId, PartyId};

use crate::delivery::DeliveryTracking;
use crate::invoice::Invoice;
use crate::kind::DocumentKind;
use crate::party::{Recipient, RecipientKind};
use crate::quote::Quote;
use crate::relation::Relation;

/// Any document the pipeline can email.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Invoice(Invoice),
    Quote(Quote),
}

/// The relation a document's recipient is reached through, and which
/// directory it points into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipientRef<'a> {
    pub kind: RecipientKind,
    pub relation: &'a Relation<PartyId, Recipient>,
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Invoice(_) => DocumentKind::Invoice,
            Document::Quote(_) => DocumentKind::Quote,
        }
    }

    pub fn id(&self) -> DocumentId {
        match self {
            Document::Invoice(i) => i.id,
            Document::Quote(q) => q.id,
        }
    }

    pub fn number(&self) -> Option<u64> {
        match self {
            Document::Invoice(i) => i.number,
            Document::Quote(q) => q.number,
        }
    }

    pub fn delivery_mut(&mut self) -> &mut DeliveryTracking {
        match self {
            Document::Invoice(i) => &mut i.delivery,
            Document::Quote(q) => &mut q.delivery,
        }
    }

    /// The number if present, otherwise the id. Used in file names.
    pub fn number_or_id(&self) -> String {
        match self.number() {
            Some(n) => n.to_string(),
            None => self.id().to_string(),
        }
    }

    /// `{entity}-{number-or-id}.pdf`
    pub fn pdf_filename(&self) -> String {
        format!("{}-{}.pdf", self.kind().as_str(), self.number_or_id())
    }

    /// Invoices go to their client; quotes go to their lead, or to their
    /// client when no lead is linked.
    pub fn recipient_ref(&self) -> Option<RecipientRef<'_>> {
        match self {
            Document::Invoice(i) => i.client.as_ref().map(|relation| RecipientRef {
                kind: RecipientKind::Client,
                relation,
            }),
            Document::Quote(q) => match (&q.lead, &q.client) {
                (Some(relation), _) => Some(RecipientRef {
                    kind: RecipientKind::Lead,
                    relation,
                }),
                (None, Some(relation)) => Some(RecipientRef {
                    kind: RecipientKind::Client,
                    relation,
                }),
                (None, None) => None,
            },
        }
    }

    /// The populated recipient, if the relation is resolved.
    pub fn recipient(&self) -> Option<&Recipient> {
        self.recipient_ref().and_then(|r| r.relation.resolved())
    }

    /// Replace the recipient relation with a fetched record.
    ///
    /// The slot is chosen by the record's kind, so a quote addressed to its
    /// client keeps its (absent) lead untouched.
    pub fn attach_recipient(&mut self, recipient: Recipient) {
        match self {
            Document::Invoice(i) => i.client = Some(Relation::Resolved(recipient)),
            Document::Quote(q) => match recipient.kind {
                RecipientKind::Lead => q.lead = Some(Relation::Resolved(recipient)),
                RecipientKind::Client => q.client = Some(Relation::Resolved(recipient)),
            },
        }
    }
}

impl From<Invoice> for Document {
    fn from(value: Invoice) -> Self {
        Document::Invoice(value)
    }
}

impl From<Quote> for Document {
    fn from(value: Quote) -> Self {
        Document::Quote(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docmail_core::Money;

    fn quote(lead: Option<Relation<PartyId, Recipient>>, client: Option<Relation<PartyId, Recipient>>) -> Quote {
        Quote {
            id: DocumentId::new(),
            number: None,
            date: Utc::now(),
            expired_date: None,
            lead,
            client,
            created_by: None,
            items: vec![],
            tax_rate: 0.0,
            sub_total: Money::ZERO,
            tax_total: Money::ZERO,
            total: Money::ZERO,
            status: None,
            notes: None,
            delivery: DeliveryTracking::default(),
        }
    }

    fn lead(email: &str) -> Recipient {
        Recipient {
            id: PartyId::new(),
            kind: RecipientKind::Lead,
            name: "Lead".to_string(),
            email: Some(email.to_string()),
        }
    }

    #[test]
    fn quote_prefers_lead_over_client() {
        let doc = Document::from(quote(
            Some(Relation::Resolved(lead("lead@x.com"))),
            Some(Relation::Reference(PartyId::new())),
        ));
        let r = doc.recipient_ref().unwrap();
        assert_eq!(r.kind, RecipientKind::Lead);
        assert_eq!(doc.recipient().unwrap().usable_email(), Some("lead@x.com"));
    }

    #[test]
    fn quote_without_lead_falls_back_to_client() {
        let client_id = PartyId::new();
        let doc = Document::from(quote(None, Some(Relation::Reference(client_id))));
        let r = doc.recipient_ref().unwrap();
        assert_eq!(r.kind, RecipientKind::Client);
        assert_eq!(r.relation, &Relation::Reference(client_id));
        assert!(doc.recipient().is_none());
    }

    #[test]
    fn quote_without_parties_has_no_recipient() {
        assert!(Document::from(quote(None, None)).recipient_ref().is_none());
    }

    #[test]
    fn attach_recipient_fills_the_matching_slot() {
        let mut doc = Document::from(quote(Some(Relation::Reference(PartyId::new())), None));
        doc.attach_recipient(lead("l@x.com"));
        assert_eq!(doc.recipient().unwrap().email.as_deref(), Some("l@x.com"));
    }

    #[test]
    fn filename_falls_back_to_id_without_number() {
        let q = quote(None, None);
        let id = q.id;
        let doc = Document::from(q);
        assert_eq!(doc.pdf_filename(), format!("quote-{id}.pdf"));
    }
}
