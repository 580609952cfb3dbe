use serde::{Deserialize, Serialize};

/// Company profile used for branding outgoing mail. Read-only here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CompanySettings {
    pub fn name(&self) -> Option<&str> {
        non_blank(&self.company_name)
    }

    pub fn email(&self) -> Option<&str> {
        non_blank(&self.company_email)
    }

    pub fn phone(&self) -> Option<&str> {
        non_blank(&self.company_phone)
    }
}
