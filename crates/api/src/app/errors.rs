use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use docmail_infra::DeliveryError;

use crate::app::dto::Envelope;
use crate::config::AppEnv;

pub fn delivery_error_to_response(err: &DeliveryError, env: AppEnv) -> Response {
    match err {
        DeliveryError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg.clone(), None),
        DeliveryError::NotFound(_) => json_error(StatusCode::NOT_FOUND, err.to_string(), None),
        DeliveryError::Persist { .. } => {
            tracing::error!(error = %err, "delivery tracking not saved");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), detail(err, env))
        }
        DeliveryError::Store(_)
        | DeliveryError::Render(_)
        | DeliveryError::Compose(_)
        | DeliveryError::Dispatch(_) => {
            tracing::error!(error = %err, "email delivery failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to send email: {err}"),
                detail(err, env),
            )
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>, error: Option<String>) -> Response {
    (status, Json(Envelope::failure(message, error))).into_response()
}

/// The full error chain, outermost first. Development only.
fn detail(err: &(dyn std::error::Error + 'static), env: AppEnv) -> Option<String> {
    if !env.is_development() {
        return None;
    }
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    Some(chain.join("\ncaused by: "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmail_documents::DocumentKind;
    use docmail_infra::{RenderError, StoreError, TransportError};

    #[test]
    fn status_codes_follow_the_error_kind() {
        let cases = [
            (DeliveryError::Validation("Document ID is required".into()), StatusCode::BAD_REQUEST),
            (DeliveryError::NotFound(DocumentKind::Invoice), StatusCode::NOT_FOUND),
            (DeliveryError::Render(RenderError::Empty), StatusCode::INTERNAL_SERVER_ERROR),
            (
                DeliveryError::Dispatch(TransportError::Rejected("550 mailbox unavailable".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DeliveryError::Persist {
                    message_id: "<m@x>".into(),
                    source: StoreError::Backend("down".into()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(delivery_error_to_response(&err, AppEnv::Production).status(), status);
        }
    }

    #[test]
    fn chain_is_only_exposed_in_development() {
        let err = DeliveryError::Persist {
            message_id: "<m@x>".into(),
            source: StoreError::Backend("connection reset".into()),
        };
        assert!(detail(&err, AppEnv::Production).is_none());
        let chain = detail(&err, AppEnv::Development).unwrap();
        assert!(chain.starts_with("email was sent"));
        assert!(chain.ends_with("caused by: store backend error: connection reset"));
    }
}
