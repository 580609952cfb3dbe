use serde::Serialize;

use docmail_documents::CompanySettings;

/// Static presentation inputs that do not live in the company settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    /// Company name used when settings carry none.
    pub fallback_company_name: String,
    /// Contact address used when settings carry none (usually the SMTP user).
    pub fallback_company_email: Option<String>,
    pub fallback_company_phone: Option<String>,
    /// Base URL of the web app, for the quote call-to-action link.
    pub frontend_url: String,
    /// Shown on invoices when present.
    pub payment_instructions: Option<PaymentInstructions>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            fallback_company_name: "Your Company".to_string(),
            fallback_company_email: None,
            fallback_company_phone: None,
            frontend_url: "https://your-app.com".to_string(),
            payment_instructions: None,
        }
    }
}

impl Branding {
    pub fn company_name<'a>(&'a self, settings: Option<&'a CompanySettings>) -> &'a str {
        settings
            .and_then(CompanySettings::name)
            .unwrap_or(self.fallback_company_name.as_str())
    }

    pub fn company_email<'a>(&'a self, settings: Option<&'a CompanySettings>) -> Option<&'a str> {
        settings
            .and_then(CompanySettings::email)
            .or(self.fallback_company_email.as_deref())
    }

    pub fn company_phone<'a>(&'a self, settings: Option<&'a CompanySettings>) -> Option<&'a str> {
        settings
            .and_then(CompanySettings::phone)
            .or(self.fallback_company_phone.as_deref())
    }

    /// `{frontend}/quote/read/{id}`
    pub fn quote_link(&self, id: impl core::fmt::Display) -> String {
        format!("{}/quote/read/{}", self.frontend_url.trim_end_matches('/'), id)
    }
}

/// Bank and UPI details printed on invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentInstructions {
    pub upi_id: Option<String>,
    pub bank_account: Option<String>,
    pub ifsc_code: Option<String>,
    pub account_holder: Option<String>,
}

impl PaymentInstructions {
    pub fn is_empty(&self) -> bool {
        self.upi_id.is_none()
            && self.bank_account.is_none()
            && self.ifsc_code.is_none()
            && self.account_holder.is_none()
    }
}
