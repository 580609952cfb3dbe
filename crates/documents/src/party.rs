use serde::{Deserialize, Serialize};

use docmail_core::{PartyId, UserId};

/// Which directory a recipient lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientKind {
    Client,
    Lead,
}

impl RecipientKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecipientKind::Client => "client",
            RecipientKind::Lead => "lead",
        }
    }
}

/// A client or lead that can receive documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: PartyId,
    pub kind: RecipientKind,
    pub name: String,
    pub email: Option<String>,
}

impl Recipient {
    /// The email address, if one is present and not blank.
    pub fn usable_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Display name, if not blank.
    pub fn display_name(&self) -> Option<&str> {
        Some(self.name.trim()).filter(|n| !n.is_empty())
    }
}

/// The user who created a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(email: Option<&str>) -> Recipient {
        Recipient {
            id: PartyId::new(),
            kind: RecipientKind::Client,
            name: "  ".to_string(),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn blank_email_is_not_usable() {
        assert_eq!(recipient(None).usable_email(), None);
        assert_eq!(recipient(Some("   ")).usable_email(), None);
        assert_eq!(recipient(Some(" a@b.com ")).usable_email(), Some("a@b.com"));
    }

    #[test]
    fn blank_name_has_no_display_name() {
        assert_eq!(recipient(None).display_name(), None);
    }
}
