/// What a subject line is announcing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind<'a> {
    Invoice,
    Quote { expired: bool },
    PaymentReceipt,
    /// Any other entity, by display name.
    Other(&'a str),
}

/// Subject line for a document mail, e.g. `Invoice #42 from Acme`.
pub fn subject_line(kind: SubjectKind<'_>, number: Option<u64>, company: &str) -> String {
    let number = number.map(|n| n.to_string()).unwrap_or_default();
    match kind {
        SubjectKind::Invoice => format!("Invoice #{number} from {company}"),
        SubjectKind::Quote { expired: true } => format!("Expired Quote #{number} from {company}"),
        SubjectKind::Quote { expired: false } => format!("Quote #{number} from {company}"),
        SubjectKind::PaymentReceipt => format!("Payment Receipt #{number} from {company}"),
        SubjectKind::Other(entity) => format!("{entity} #{number} from {company}"),
    }
}
