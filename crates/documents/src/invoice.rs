use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docmail_core::{DocumentId, Money, PartyId, UserId};

use crate::delivery::DeliveryTracking;
use crate::line_item::LineItem;
use crate::party::{Creator, Recipient};
use crate::relation::Relation;

/// Payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Partially,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partially => "partially",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

/// An invoice as loaded from the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: DocumentId,
    pub number: Option<u64>,
    pub date: DateTime<Utc>,
    /// Due date.
    pub expired_date: Option<DateTime<Utc>>,
    pub client: Option<Relation<PartyId, Recipient>>,
    pub created_by: Option<Relation<UserId, Creator>>,
    pub items: Vec<LineItem>,
    /// Percentage, e.g. `18.0`.
    pub tax_rate: f64,
    pub sub_total: Money,
    pub tax_total: Money,
    pub total: Money,
    /// Amount already paid.
    pub credit: Money,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub delivery: DeliveryTracking,
}

impl Invoice {
    pub fn has_partial_payment(&self) -> bool {
        self.credit.is_positive()
    }

    pub fn balance_due(&self) -> Money {
        self.total - self.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(total: i64, credit: i64) -> Invoice {
        Invoice {
            id: DocumentId::new(),
            number: Some(7),
            date: Utc::now(),
            expired_date: None,
            client: Some(Relation::Reference(PartyId::new())),
            created_by: None,
            items: vec![],
            tax_rate: 0.0,
            sub_total: Money::from_rupees(total),
            tax_total: Money::ZERO,
            total: Money::from_rupees(total),
            credit: Money::from_rupees(credit),
            payment_status: Some(PaymentStatus::Partially),
            notes: None,
            delivery: DeliveryTracking::default(),
        }
    }

    #[test]
    fn balance_due_subtracts_credit() {
        let inv = invoice(1000, 400);
        assert!(inv.has_partial_payment());
        assert_eq!(inv.balance_due(), Money::from_rupees(600));
    }

    #[test]
    fn no_credit_means_no_partial_payment() {
        assert!(!invoice(1000, 0).has_partial_payment());
    }

    #[test]
    fn delivery_fields_are_flattened() {
        let json = serde_json::to_value(invoice(10, 0)).unwrap();
        assert_eq!(json["emailed"], false);
        assert_eq!(json["paymentStatus"], "partially");
        assert!(json.get("delivery").is_none());
    }
}
