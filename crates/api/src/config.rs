//! Environment-sourced configuration, resolved once at startup.

use std::net::SocketAddr;

use thiserror::Error;

use docmail_infra::SmtpConfig;
use docmail_mailer::{Branding, PaymentInstructions, SenderIdentity};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PDF_ENGINE: &str = "docmail-pdf";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Deployment mode. Development responses carry error chains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    #[default]
    Production,
}

impl AppEnv {
    pub fn is_development(self) -> bool {
        self == AppEnv::Development
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub environment: AppEnv,
    pub smtp: SmtpConfig,
    /// `EMAIL_FROM` override for the `From:` header.
    pub email_from: Option<String>,
    pub frontend_url: String,
    /// Command line of the PDF engine.
    pub pdf_engine: String,
    pub payment: Option<PaymentInstructions>,
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let environment = match get("APP_ENV") {
            Some(v) if v.eq_ignore_ascii_case("development") => AppEnv::Development,
            _ => AppEnv::Production,
        };

        let defaults = SmtpConfig::default();
        let port = match get("EMAIL_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "EMAIL_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.port,
        };
        let smtp = SmtpConfig {
            host: get("EMAIL_HOST").unwrap_or(defaults.host),
            port,
            secure: get("EMAIL_SECURE").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            username: get("EMAIL_USER"),
            password: get("EMAIL_PASSWORD"),
        };

        let email_from = get("EMAIL_FROM");
        if email_from.is_none() && smtp.username.is_none() {
            return Err(ConfigError::Missing("EMAIL_FROM or EMAIL_USER"));
        }

        let payment = PaymentInstructions {
            upi_id: get("PAYMENT_UPI_ID"),
            bank_account: get("PAYMENT_BANK_ACCOUNT"),
            ifsc_code: get("PAYMENT_IFSC"),
            account_holder: get("PAYMENT_ACCOUNT_HOLDER"),
        };

        Ok(Self {
            bind_addr,
            environment,
            smtp,
            email_from,
            frontend_url: get("FRONTEND_URL").unwrap_or_else(|| Branding::default().frontend_url),
            pdf_engine: get("PDF_ENGINE").unwrap_or_else(|| DEFAULT_PDF_ENGINE.to_string()),
            payment: (!payment.is_empty()).then_some(payment),
            database_url: get("DATABASE_URL"),
        })
    }

    /// Presentation inputs for the composer. The SMTP user doubles as the
    /// contact address when the company profile has none.
    pub fn branding(&self) -> Branding {
        Branding {
            fallback_company_email: self.smtp.username.clone(),
            frontend_url: self.frontend_url.clone(),
            payment_instructions: self.payment.clone(),
            ..Branding::default()
        }
    }

    pub fn sender(&self) -> SenderIdentity {
        SenderIdentity {
            explicit_from: self.email_from.clone(),
            address: self
                .smtp
                .username
                .clone()
                .or_else(|| self.email_from.clone())
                .unwrap_or_default(),
        }
    }
}
