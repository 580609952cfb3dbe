use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use docmail_api::app::{AppServices, SharedMailer, build_app};
use docmail_api::config::AppEnv;
use docmail_core::{DocumentId, Money, PartyId};
use docmail_documents::{
    CompanySettings, DeliveryTracking, Invoice, LineItem, PaymentStatus, Quote, QuoteStatus,
    Recipient, RecipientKind, Relation,
};
use docmail_infra::{
    DocumentMailer, DocumentStore, InMemoryDocumentStore, MailTransport, PdfRenderer,
    RecordingTransport, StaticPdfRenderer,
};
use docmail_mailer::{Branding, MailComposer, SenderIdentity};

struct TestServer {
    base_url: String,
    store: Arc<InMemoryDocumentStore>,
    transport: Arc<RecordingTransport>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(env: AppEnv, transport: RecordingTransport) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let transport = Arc::new(transport);
        let mailer: SharedMailer = DocumentMailer::new(
            store.clone() as Arc<dyn DocumentStore>,
            Arc::new(StaticPdfRenderer::new(b"%PDF-1.7 black-box".to_vec())) as Arc<dyn PdfRenderer>,
            transport.clone() as Arc<dyn MailTransport>,
            MailComposer::new(Branding::default()).expect("templates load"),
            SenderIdentity {
                explicit_from: None,
                address: "mailer@acme.test".into(),
            },
        );

        // Same router as prod, bound to an ephemeral port.
        let app = build_app(Arc::new(AppServices::new(mailer, env)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            transport,
            handle,
        }
    }

    async fn ok() -> Self {
        Self::spawn(AppEnv::Production, RecordingTransport::new()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn recipient(kind: RecipientKind, email: Option<&str>) -> Recipient {
    Recipient {
        id: PartyId::new(),
        kind,
        name: "Asha Rao".into(),
        email: email.map(str::to_string),
    }
}

fn invoice(client: &Recipient) -> Invoice {
    Invoice {
        id: DocumentId::new(),
        number: Some(1001),
        date: Utc::now(),
        expired_date: Some(Utc::now() + ChronoDuration::days(15)),
        client: Some(Relation::Reference(client.id)),
        created_by: None,
        items: vec![],
        tax_rate: 0.0,
        sub_total: Money::from_rupees(1000),
        tax_total: Money::ZERO,
        total: Money::from_rupees(1000),
        credit: Money::from_rupees(400),
        payment_status: Some(PaymentStatus::Partially),
        notes: None,
        delivery: DeliveryTracking::default(),
    }
}

fn quote(lead: &Recipient, expires_in_days: i64) -> Quote {
    Quote {
        id: DocumentId::new(),
        number: Some(77),
        date: Utc::now(),
        expired_date: Some(Utc::now() + ChronoDuration::days(expires_in_days)),
        lead: Some(Relation::Reference(lead.id)),
        client: None,
        created_by: None,
        items: vec![LineItem {
            item_name: "Design".into(),
            description: Some("Landing page".into()),
            quantity: 2.0,
            price: Money::from_rupees(500),
            total: Money::from_rupees(1000),
        }],
        tax_rate: 0.0,
        sub_total: Money::from_rupees(1000),
        tax_total: Money::ZERO,
        total: Money::from_rupees(1000),
        status: Some(QuoteStatus::Sent),
        notes: None,
        delivery: DeliveryTracking::default(),
    }
}

async fn post_mail(
    srv: &TestServer,
    entity: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let res = reqwest::Client::new()
        .post(format!("{}/{}/mail", srv.base_url, entity))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::ok().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn invoice_mail_is_sent_and_tracked() {
    let srv = TestServer::ok().await;
    let client = recipient(RecipientKind::Client, Some("asha@example.com"));
    let inv = invoice(&client);
    let id = inv.id;
    srv.store.insert_recipient(client);
    srv.store.insert_invoice(inv);
    srv.store.set_company_settings(CompanySettings {
        company_name: Some("Acme Traders".into()),
        ..CompanySettings::default()
    });

    let (status, body) = post_mail(&srv, "invoice", json!({ "id": id.to_string() })).await;

    assert_eq!(status, StatusCode::OK, "body={body}");
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "invoice #1001 sent successfully to asha@example.com"
    );
    assert_eq!(body["result"]["recipient"], "asha@example.com");
    assert_eq!(body["result"]["documentId"], id.to_string());
    assert_eq!(body["result"]["entity"], "invoice");
    assert_eq!(body["result"]["number"], 1001);
    assert_eq!(body["result"]["messageId"], "<recorded-1@localhost>");

    let stored = srv.store.invoice(id).unwrap();
    assert!(stored.delivery.emailed);
    assert!(stored.delivery.email_sent_at.is_some());
    assert_eq!(stored.delivery.email_recipient.as_deref(), Some("asha@example.com"));

    let sent = srv.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Invoice #1001 from Acme Traders");
    assert_eq!(sent[0].from, "\"Acme Traders\" <mailer@acme.test>");
    assert!(sent[0].html.contains("₹400.00"));
    assert!(sent[0].html.contains("₹600.00"));
    assert_eq!(sent[0].attachments[0].filename, "invoice-1001.pdf");
}

#[tokio::test]
async fn quote_mail_goes_to_the_lead() {
    let srv = TestServer::ok().await;
    let lead = recipient(RecipientKind::Lead, Some("lead@example.com"));
    let q = quote(&lead, 10);
    let id = q.id;
    srv.store.insert_recipient(lead);
    srv.store.insert_quote(q);

    let (status, body) = post_mail(&srv, "quote", json!({ "id": id.to_string() })).await;

    assert_eq!(status, StatusCode::OK, "body={body}");
    assert_eq!(body["message"], "quote #77 sent successfully to lead@example.com");
    let sent = srv.transport.sent();
    assert_eq!(sent[0].subject, "Quote #77 from Your Company");
    assert_eq!(sent[0].attachments[0].filename, "quote-77.pdf");
    assert!(srv.store.quote(id).unwrap().delivery.emailed);
}

#[tokio::test]
async fn expired_quote_subject_says_so() {
    let srv = TestServer::ok().await;
    let lead = recipient(RecipientKind::Lead, Some("lead@example.com"));
    let q = quote(&lead, -3);
    let id = q.id;
    srv.store.insert_recipient(lead);
    srv.store.insert_quote(q);

    let (status, _) = post_mail(&srv, "quote", json!({ "id": id.to_string() })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(srv.transport.sent()[0].subject, "Expired Quote #77 from Your Company");
}

#[tokio::test]
async fn missing_id_is_bad_request() {
    let srv = TestServer::ok().await;

    let (status, body) = post_mail(&srv, "invoice", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["result"].is_null());
    assert_eq!(body["message"], "Document ID is required");

    // No body at all reads the same way.
    let res = reqwest::Client::new()
        .post(format!("{}/quote/mail", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let srv = TestServer::ok().await;
    let (status, body) = post_mail(&srv, "quote", json!({ "id": "12" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_document_is_not_found() {
    let srv = TestServer::ok().await;

    let (status, body) =
        post_mail(&srv, "invoice", json!({ "id": DocumentId::new().to_string() })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "invoice not found");
    assert!(srv.transport.sent().is_empty());
}

#[tokio::test]
async fn recipient_without_email_is_bad_request() {
    let srv = TestServer::ok().await;
    let client = recipient(RecipientKind::Client, None);
    let inv = invoice(&client);
    let id = inv.id;
    srv.store.insert_recipient(client);
    srv.store.insert_invoice(inv);

    let (status, body) = post_mail(&srv, "invoice", json!({ "id": id.to_string() })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Client email not found");
    assert!(srv.transport.sent().is_empty());
    assert!(!srv.store.invoice(id).unwrap().delivery.emailed);
}

#[tokio::test]
async fn transport_failure_is_a_server_error_without_tracking() {
    let srv = TestServer::spawn(AppEnv::Production, RecordingTransport::failing("connection refused")).await;
    let client = recipient(RecipientKind::Client, Some("asha@example.com"));
    let inv = invoice(&client);
    let id = inv.id;
    srv.store.insert_recipient(client);
    srv.store.insert_invoice(inv);

    let (status, body) = post_mail(&srv, "invoice", json!({ "id": id.to_string() })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to send email: connection refused");
    assert!(body.get("error").is_none());
    assert_eq!(srv.store.invoice(id).unwrap().delivery, DeliveryTracking::default());
}

#[tokio::test]
async fn development_mode_adds_the_error_chain() {
    let srv = TestServer::spawn(AppEnv::Development, RecordingTransport::failing("connection refused")).await;
    let client = recipient(RecipientKind::Client, Some("asha@example.com"));
    let inv = invoice(&client);
    let id = inv.id;
    srv.store.insert_recipient(client);
    srv.store.insert_invoice(inv);

    let (status, body) = post_mail(&srv, "invoice", json!({ "id": id.to_string() })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}
