use axum::{
    routing::{get, post},
    Router,
};

pub mod mail;
pub mod system;

/// Router for the document mail endpoints and the health probe.
pub fn router() -> Router {
    Router::new()
        .route("/invoice/mail", post(mail::send_invoice))
        .route("/quote/mail", post(mail::send_quote))
        .route("/health", get(system::health))
}
