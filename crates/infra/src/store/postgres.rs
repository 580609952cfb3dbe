//! Postgres-backed document store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database / Io / Tls / PoolTimedOut / PoolClosed | `Backend` |
//! | ColumnDecode / Decode / ColumnNotFound | `Corrupt` |
//! | anything else | `Backend` |

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use async_trait::async_trait;

use docmail_core::{DocumentId, PartyId, UserId};
use docmail_documents::{
    CompanySettings, Creator, DeliveryTracking, Invoice, Quote, Recipient, RecipientKind,
    Relation,
};

use super::{DocumentStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_documents.sql");

/// Document store over the `invoices`, `quotes`, `clients`, `leads`, `users`
/// and `company_settings` tables. Rows flagged `removed` are treated as absent.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect a small pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema. Idempotent.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn find_document<T: DeserializeOwned>(
        &self,
        table: &'static str,
        id: DocumentId,
    ) -> Result<Option<T>, StoreError> {
        let sql = format!(
            "SELECT body, emailed, email_sent_at, email_recipient FROM {table} \
             WHERE id = $1 AND NOT removed"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        row.map(|row| decode_document(id, &row)).transpose()
    }

    async fn find_party(
        &self,
        kind: RecipientKind,
        id: PartyId,
    ) -> Result<Option<Recipient>, StoreError> {
        let sql = match kind {
            RecipientKind::Client => "SELECT name, email FROM clients WHERE id = $1 AND NOT removed",
            RecipientKind::Lead => "SELECT name, email FROM leads WHERE id = $1 AND NOT removed",
        };
        let row = sqlx::query(sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(kind.as_str(), e))?;

        row.map(|row| {
            Ok(Recipient {
                id,
                kind,
                name: row.try_get("name").map_err(|e| map_sqlx_error(kind.as_str(), e))?,
                email: row.try_get("email").map_err(|e| map_sqlx_error(kind.as_str(), e))?,
            })
        })
        .transpose()
    }

    async fn populate(
        &self,
        relation: &mut Option<Relation<PartyId, Recipient>>,
        kind: RecipientKind,
    ) -> Result<(), StoreError> {
        if let Some(Relation::Reference(id)) = relation.as_ref() {
            if let Some(found) = self.find_party(kind, *id).await? {
                *relation = Some(Relation::Resolved(found));
            }
        }
        Ok(())
    }

    async fn populate_creator(
        &self,
        relation: &mut Option<Relation<UserId, Creator>>,
    ) -> Result<(), StoreError> {
        if let Some(Relation::Reference(id)) = relation.as_ref() {
            if let Some(found) = self.find_user(*id).await? {
                *relation = Some(Relation::Resolved(found));
            }
        }
        Ok(())
    }

    async fn write_delivery(
        &self,
        table: &'static str,
        id: DocumentId,
        delivery: &DeliveryTracking,
    ) -> Result<(), StoreError> {
        let sql = format!(
            "UPDATE {table} SET emailed = $2, email_sent_at = $3, email_recipient = $4 \
             WHERE id = $1 AND NOT removed"
        );
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(delivery.emailed)
            .bind(delivery.email_sent_at)
            .bind(delivery.email_recipient.as_deref())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("{table} {id}")));
        }
        Ok(())
    }
}

/// Merge the row's id and delivery columns into the JSON body and decode it.
fn decode_document<T: DeserializeOwned>(id: DocumentId, row: &PgRow) -> Result<T, StoreError> {
    let mut body: JsonValue = row.try_get("body").map_err(|e| map_sqlx_error("body", e))?;
    let delivery = DeliveryTracking {
        emailed: row.try_get("emailed").map_err(|e| map_sqlx_error("emailed", e))?,
        email_sent_at: row
            .try_get::<Option<DateTime<Utc>>, _>("email_sent_at")
            .map_err(|e| map_sqlx_error("email_sent_at", e))?,
        email_recipient: row
            .try_get("email_recipient")
            .map_err(|e| map_sqlx_error("email_recipient", e))?,
    };

    let object = body
        .as_object_mut()
        .ok_or_else(|| StoreError::Corrupt(format!("document {id}: body is not an object")))?;
    object.insert("id".to_string(), JsonValue::String(id.to_string()));
    if let Ok(JsonValue::Object(fields)) = serde_json::to_value(&delivery) {
        object.extend(fields);
    }

    serde_json::from_value(body).map_err(|e| StoreError::Corrupt(format!("document {id}: {e}")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(format!("{operation}: {err}"))
        }
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self), fields(document_id = %id), err)]
    async fn find_invoice(&self, id: DocumentId) -> Result<Option<Invoice>, StoreError> {
        let Some(mut invoice) = self.find_document::<Invoice>("invoices", id).await? else {
            return Ok(None);
        };
        self.populate(&mut invoice.client, RecipientKind::Client).await?;
        self.populate_creator(&mut invoice.created_by).await?;
        Ok(Some(invoice))
    }

    #[instrument(skip(self), fields(document_id = %id), err)]
    async fn find_quote(&self, id: DocumentId) -> Result<Option<Quote>, StoreError> {
        let Some(mut quote) = self.find_document::<Quote>("quotes", id).await? else {
            return Ok(None);
        };
        self.populate(&mut quote.lead, RecipientKind::Lead).await?;
        self.populate(&mut quote.client, RecipientKind::Client).await?;
        self.populate_creator(&mut quote.created_by).await?;
        Ok(Some(quote))
    }

    async fn find_client(&self, id: PartyId) -> Result<Option<Recipient>, StoreError> {
        self.find_party(RecipientKind::Client, id).await
    }

    async fn find_lead(&self, id: PartyId) -> Result<Option<Recipient>, StoreError> {
        self.find_party(RecipientKind::Lead, id).await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<Creator>, StoreError> {
        let row = sqlx::query("SELECT name, email FROM users WHERE id = $1 AND NOT removed")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users", e))?;

        row.map(|row| {
            Ok(Creator {
                id,
                name: row.try_get("name").map_err(|e| map_sqlx_error("users", e))?,
                email: row.try_get("email").map_err(|e| map_sqlx_error("users", e))?,
            })
        })
        .transpose()
    }

    async fn company_settings(&self) -> Result<Option<CompanySettings>, StoreError> {
        let row = sqlx::query(
            "SELECT company_name, company_email, company_phone FROM company_settings WHERE id = 1",
        )
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("company_settings", e))?;

        row.map(|row| {
            Ok(CompanySettings {
                company_name: row.try_get("company_name").map_err(|e| map_sqlx_error("company_name", e))?,
                company_email: row.try_get("company_email").map_err(|e| map_sqlx_error("company_email", e))?,
                company_phone: row.try_get("company_phone").map_err(|e| map_sqlx_error("company_phone", e))?,
            })
        })
        .transpose()
    }

    #[instrument(skip(self, delivery), fields(document_id = %id), err)]
    async fn record_invoice_delivery(
        &self,
        id: DocumentId,
        delivery: &DeliveryTracking,
    ) -> Result<(), StoreError> {
        self.write_delivery("invoices", id, delivery).await
    }

    #[instrument(skip(self, delivery), fields(document_id = %id), err)]
    async fn record_quote_delivery(
        &self,
        id: DocumentId,
        delivery: &DeliveryTracking,
    ) -> Result<(), StoreError> {
        self.write_delivery("quotes", id, delivery).await
    }
}
