use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use docmail_documents::DocumentKind;

use crate::app::dto::{self, Envelope, MailResult, SendMailRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn send_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SendMailRequest>, JsonRejection>,
) -> Response {
    send(&services, DocumentKind::Invoice, body).await
}

pub async fn send_quote(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SendMailRequest>, JsonRejection>,
) -> Response {
    send(&services, DocumentKind::Quote, body).await
}

async fn send(
    services: &AppServices,
    kind: DocumentKind,
    body: Result<Json<SendMailRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        // No JSON body at all reads as a missing id; anything else is malformed input.
        Err(JsonRejection::MissingJsonContentType(_)) => SendMailRequest::default(),
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, rejection.body_text(), None);
        }
    };

    match services.mailer.deliver(kind, request.id.as_deref()).await {
        Ok(outcome) => {
            let message = dto::success_message(&outcome);
            (StatusCode::OK, Json(Envelope::ok(MailResult::from(&outcome), message))).into_response()
        }
        Err(err) => errors::delivery_error_to_response(&err, services.environment),
    }
}
