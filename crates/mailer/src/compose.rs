//! Subject and HTML body for a document mail.

use chrono::{DateTime, Utc};
use minijinja::{Environment, Value};
use serde::Serialize;
use thiserror::Error;

use docmail_documents::{
    CompanySettings, Document, Invoice, LineItem, PaymentStatus, Quote, QuoteStatus,
};

use crate::branding::{Branding, PaymentInstructions};
use crate::format::{format_date, format_inr, format_optional_date};
use crate::subject::{SubjectKind, subject_line};

const INVOICE_TEMPLATE: &str = "invoice.html";
const QUOTE_TEMPLATE: &str = "quote.html";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Subject line and HTML body, ready to be addressed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub subject: String,
    pub html: String,
}

/// Renders document mails from the embedded templates.
pub struct MailComposer {
    env: Environment<'static>,
    branding: Branding,
}

impl core::fmt::Debug for MailComposer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MailComposer")
            .field("branding", &self.branding)
            .finish_non_exhaustive()
    }
}

impl MailComposer {
    pub fn new(branding: Branding) -> Result<Self, ComposeError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template(INVOICE_TEMPLATE, include_str!("../templates/invoice.html"))?;
        env.add_template(QUOTE_TEMPLATE, include_str!("../templates/quote.html"))?;
        Ok(Self { env, branding })
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    /// Subject line for `document` as of `now`.
    pub fn subject(
        &self,
        document: &Document,
        settings: Option<&CompanySettings>,
        now: DateTime<Utc>,
    ) -> String {
        let kind = match document {
            Document::Invoice(_) => SubjectKind::Invoice,
            Document::Quote(q) => SubjectKind::Quote {
                expired: q.is_expired(now),
            },
        };
        subject_line(kind, document.number(), self.branding.company_name(settings))
    }

    pub fn compose(
        &self,
        document: &Document,
        settings: Option<&CompanySettings>,
        now: DateTime<Utc>,
    ) -> Result<ComposedEmail, ComposeError> {
        let subject = self.subject(document, settings, now);
        let company = CompanyView {
            name: self.branding.company_name(settings),
            email: self.branding.company_email(settings),
            phone: self.branding.company_phone(settings),
        };
        let greeting = document.recipient().and_then(|r| r.display_name());

        let html = match document {
            Document::Invoice(invoice) => {
                let view = self.invoice_view(invoice, greeting, company);
                self.env.get_template(INVOICE_TEMPLATE)?.render(&view)?
            }
            Document::Quote(quote) => {
                let view = self.quote_view(quote, greeting, company, now);
                self.env.get_template(QUOTE_TEMPLATE)?.render(&view)?
            }
        };

        tracing::debug!(
            entity = %document.kind(),
            document_id = %document.id(),
            bytes = html.len(),
            "composed document mail"
        );

        Ok(ComposedEmail { subject, html })
    }

    fn invoice_view<'a>(
        &'a self,
        invoice: &'a Invoice,
        greeting: Option<&'a str>,
        company: CompanyView<'a>,
    ) -> InvoiceView<'a> {
        InvoiceView {
            entity: "Invoice",
            number: display_number(invoice.number),
            greeting_name: greeting.unwrap_or("Valued Customer"),
            date: format_date(invoice.date),
            due_date: invoice.expired_date.map(format_date),
            total: format_inr(invoice.total),
            status: invoice.payment_status.map(|s| Badge {
                label: s.as_str(),
                color: payment_status_color(s),
            }),
            paid: invoice.has_partial_payment().then(|| PaidView {
                amount_paid: format_inr(invoice.credit),
                balance_due: format_inr(invoice.balance_due()),
            }),
            payment: self
                .branding
                .payment_instructions
                .as_ref()
                .filter(|p| !p.is_empty()),
            company,
        }
    }

    fn quote_view<'a>(
        &'a self,
        quote: &'a Quote,
        greeting: Option<&'a str>,
        company: CompanyView<'a>,
        now: DateTime<Utc>,
    ) -> QuoteView<'a> {
        let expired = quote.is_expired(now);
        QuoteView {
            entity: "Quote",
            number: display_number(quote.number),
            greeting_name: greeting.unwrap_or("Valued Client"),
            prepared_for: greeting.unwrap_or("Client"),
            date: format_date(quote.date),
            // Dates never carry markup; marking safe keeps `N/A` readable.
            valid_until: Value::from_safe_string(format_optional_date(quote.expired_date)),
            total: format_inr(quote.total),
            badge: quote_badge(quote.status, expired),
            expired,
            items: quote.items.iter().map(ItemRow::from).collect(),
            sub_total: format_inr(quote.sub_total),
            tax: quote.has_tax().then(|| TaxView {
                rate: quote.tax_rate.to_string(),
                amount: format_inr(quote.tax_total),
            }),
            notes: quote
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty()),
            // Built from configuration and a uuid; escaping would mangle the slashes.
            cta_url: Value::from_safe_string(self.branding.quote_link(quote.id)),
            company,
        }
    }
}

fn display_number(number: Option<u64>) -> String {
    number.map(|n| n.to_string()).unwrap_or_default()
}

pub(crate) fn payment_status_color(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "#10b981",
        PaymentStatus::Partially => "#3b82f6",
        PaymentStatus::Pending => "#f59e0b",
        PaymentStatus::Overdue => "#ef4444",
        PaymentStatus::Unpaid => "#6b7280",
    }
}

pub(crate) fn quote_badge(status: Option<QuoteStatus>, expired: bool) -> Badge {
    if expired {
        return Badge {
            label: "EXPIRED",
            color: "#ef4444",
        };
    }
    let color = match status {
        Some(QuoteStatus::Accepted) => "#10b981",
        Some(QuoteStatus::Declined | QuoteStatus::Rejected) => "#6b7280",
        _ => "#f59e0b",
    };
    Badge {
        label: status.map(QuoteStatus::as_str).unwrap_or("PENDING"),
        color,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct Badge {
    label: &'static str,
    color: &'static str,
}

#[derive(Debug, Serialize)]
struct CompanyView<'a> {
    name: &'a str,
    email: Option<&'a str>,
    phone: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PaidView {
    amount_paid: String,
    balance_due: String,
}

#[derive(Debug, Serialize)]
struct InvoiceView<'a> {
    entity: &'static str,
    number: String,
    greeting_name: &'a str,
    date: String,
    due_date: Option<String>,
    total: String,
    status: Option<Badge>,
    paid: Option<PaidView>,
    payment: Option<&'a PaymentInstructions>,
    company: CompanyView<'a>,
}

#[derive(Debug, Serialize)]
struct ItemRow<'a> {
    name: &'a str,
    description: &'a str,
    quantity: String,
    unit_price: String,
    total: String,
}

impl<'a> From<&'a LineItem> for ItemRow<'a> {
    fn from(item: &'a LineItem) -> Self {
        Self {
            name: &item.item_name,
            description: item.description.as_deref().unwrap_or(""),
            quantity: item.quantity.to_string(),
            unit_price: format_inr(item.price),
            total: format_inr(item.total),
        }
    }
}

#[derive(Debug, Serialize)]
struct TaxView {
    rate: String,
    amount: String,
}

#[derive(Debug, Serialize)]
struct QuoteView<'a> {
    entity: &'static str,
    number: String,
    greeting_name: &'a str,
    prepared_for: &'a str,
    date: String,
    valid_until: Value,
    total: String,
    badge: Badge,
    expired: bool,
    items: Vec<ItemRow<'a>>,
    sub_total: String,
    tax: Option<TaxView>,
    notes: Option<&'a str>,
    cta_url: Value,
    company: CompanyView<'a>,
}
