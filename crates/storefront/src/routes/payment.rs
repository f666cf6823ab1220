//! Payment gateway callback routes.
//!
//! The gateway redirects the browser back here after a hosted payment
//! attempt. Neither landing route carries a machine-parseable payload;
//! the authoritative payment result arrives out-of-band on the notify
//! endpoint.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::RawForm;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;

use crate::models::session_keys;
use crate::services::checkout::PendingCheckout;

/// Payment success page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/success.html")]
pub struct PaymentSuccessTemplate {}

/// Payment cancelled page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/cancel.html")]
pub struct PaymentCancelTemplate {}

/// Gateway return route: the shopper completed the hosted payment page.
#[instrument(skip(session))]
pub async fn success(session: Session) -> impl IntoResponse {
    // The flow is over; drop the in-flight checkout record
    if let Err(e) = session
        .remove::<PendingCheckout>(session_keys::CHECKOUT)
        .await
    {
        tracing::warn!("Failed to clear pending checkout after payment: {e}");
    }

    PaymentSuccessTemplate {}
}

/// Gateway cancel route: the shopper backed out of the hosted payment page.
///
/// The cart was already cleared at hand-off; the order stays on file as
/// unpaid and remains payable from order history.
#[instrument(skip(session))]
pub async fn cancel(session: Session) -> impl IntoResponse {
    if let Err(e) = session
        .remove::<PendingCheckout>(session_keys::CHECKOUT)
        .await
    {
        tracing::warn!("Failed to clear pending checkout after cancel: {e}");
    }

    PaymentCancelTemplate {}
}

/// Gateway server-to-server callback.
///
/// Logged for reconciliation; this layer does not process payment results.
#[instrument(skip(body))]
pub async fn notify(RawForm(body): RawForm) -> StatusCode {
    tracing::info!(
        payload = %String::from_utf8_lossy(&body),
        "Payment gateway notification received"
    );
    StatusCode::OK
}
