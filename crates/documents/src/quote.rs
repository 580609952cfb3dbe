use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docmail_core::{DocumentId, Money, PartyId, UserId};

use crate::delivery::DeliveryTracking;
use crate::line_item::LineItem;
use crate::party::{Creator, Recipient};
use crate::relation::Relation;

/// Lifecycle status of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Pending,
    Sent,
    Accepted,
    Declined,
    Rejected,
    Cancelled,
    #[serde(rename = "on hold")]
    OnHold,
}

impl QuoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Pending => "pending",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Declined => "declined",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Cancelled => "cancelled",
            QuoteStatus::OnHold => "on hold",
        }
    }
}

/// A quote (proposal) as loaded from the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: DocumentId,
    pub number: Option<u64>,
    pub date: DateTime<Utc>,
    /// Valid-until date.
    pub expired_date: Option<DateTime<Utc>>,
    pub lead: Option<Relation<PartyId, Recipient>>,
    pub client: Option<Relation<PartyId, Recipient>>,
    pub created_by: Option<Relation<UserId, Creator>>,
    pub items: Vec<LineItem>,
    /// Percentage, e.g. `18.0`.
    pub tax_rate: f64,
    pub sub_total: Money,
    pub tax_total: Money,
    pub total: Money,
    pub status: Option<QuoteStatus>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub delivery: DeliveryTracking,
}

impl Quote {
    /// A quote is expired once `now` is strictly past its expiry date.
    /// Quotes without an expiry date never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expired_date.is_some_and(|expiry| now > expiry)
    }

    pub fn has_tax(&self) -> bool {
        self.tax_rate > 0.0
    }
}
