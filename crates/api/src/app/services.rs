//! Infrastructure wiring: store, PDF engine, SMTP transport and the mailer.

use std::sync::Arc;

use anyhow::Context;

use docmail_infra::{
    DocumentMailer, DocumentStore, ExternalPdfRenderer, InMemoryDocumentStore, MailTransport,
    PdfRenderer, SmtpMailTransport,
};
use docmail_mailer::MailComposer;

use crate::config::{AppConfig, AppEnv};

/// The pipeline as the HTTP layer holds it: every collaborator behind a trait object.
pub type SharedMailer =
    DocumentMailer<Arc<dyn DocumentStore>, Arc<dyn PdfRenderer>, Arc<dyn MailTransport>>;

/// Shared, read-only state handed to every handler.
pub struct AppServices {
    pub mailer: SharedMailer,
    pub environment: AppEnv,
}

impl AppServices {
    pub fn new(mailer: SharedMailer, environment: AppEnv) -> Self {
        Self {
            mailer,
            environment,
        }
    }
}

/// Wire production services from configuration.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store = build_store(config).await?;

    let renderer = ExternalPdfRenderer::from_command_line(&config.pdf_engine)
        .context("PDF_ENGINE is empty")?;
    tracing::info!(program = %renderer.program(), "pdf engine configured");

    let transport = SmtpMailTransport::new(&config.smtp).context("failed to configure SMTP")?;
    tracing::info!(
        host = %config.smtp.host,
        port = config.smtp.port,
        secure = config.smtp.secure,
        "smtp transport configured"
    );

    let composer = MailComposer::new(config.branding()).context("failed to load mail templates")?;
    let mailer = DocumentMailer::new(
        store,
        Arc::new(renderer) as Arc<dyn PdfRenderer>,
        Arc::new(transport) as Arc<dyn MailTransport>,
        composer,
        config.sender(),
    );

    Ok(AppServices::new(mailer, config.environment))
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    if let Some(url) = config.database_url.as_deref() {
        #[cfg(feature = "postgres")]
        {
            let store = docmail_infra::PostgresDocumentStore::connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            store.migrate().await.context("failed to apply schema")?;
            tracing::info!("using postgres document store");
            return Ok(Arc::new(store));
        }
        #[cfg(not(feature = "postgres"))]
        {
            let _ = url;
            tracing::warn!(
                "DATABASE_URL set but postgres feature not enabled, falling back to in-memory"
            );
        }
    }

    tracing::info!("using in-memory document store");
    Ok(Arc::new(InMemoryDocumentStore::new()))
}
