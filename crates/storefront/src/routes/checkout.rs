//! Checkout route handlers.
//!
//! The flow spans three requests: the contact form, the payment-method
//! step, and either the gateway hand-off (online) or the in-place invoice
//! (cash). The in-flight checkout is kept in the session so reloads land on
//! the legal step and a double submit cannot create a second order.
//!
//! Cart clearing is deliberately uneven between the branches: online clears
//! before the browser leaves for the gateway, cash clears only when the
//! shopper dismisses the invoice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;

use kingsway_core::{InvoiceNumber, PaymentMethod, Phone, Price};

use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::models::cart;
use crate::models::session_keys;
use crate::routes::cart::CartView;
use crate::services::checkout::{
    CheckoutError, CheckoutForm, CheckoutStage, PendingCheckout, record_payment_choice,
    submit as submit_order, validate,
};
use crate::services::gateway::{GatewayRedirect, build_redirect};
use crate::services::invoice::{InvoiceView, build_invoice};
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the in-flight checkout from the session.
async fn get_pending(session: &Session) -> Option<PendingCheckout> {
    session
        .get::<PendingCheckout>(session_keys::CHECKOUT)
        .await
        .ok()
        .flatten()
}

/// Store the in-flight checkout in the session.
async fn set_pending(session: &Session, pending: &PendingCheckout) {
    if let Err(e) = session.insert(session_keys::CHECKOUT, pending).await {
        tracing::error!("Failed to store pending checkout in session: {e}");
    }
}

/// Remove the in-flight checkout from the session.
async fn clear_pending(session: &Session) {
    if let Err(e) = session
        .remove::<PendingCheckout>(session_keys::CHECKOUT)
        .await
    {
        tracing::error!("Failed to clear pending checkout from session: {e}");
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout contact/delivery form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub error: Option<String>,
    pub cart: CartView,
}

/// Payment method selection template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub invoice_no: String,
    pub total: String,
}

/// Auto-submitting gateway redirect form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/gateway_redirect.html")]
pub struct GatewayRedirectTemplate {
    pub redirect: GatewayRedirect,
}

/// In-place invoice template (cash path and reloads of it).
#[derive(Template, WebTemplate)]
#[template(path = "checkout/invoice.html")]
pub struct InvoiceTemplate {
    pub invoice: InvoiceView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout form, prefilled from the stored profile when the
/// shopper is signed in.
#[instrument(skip(state, session, auth))]
pub async fn form_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Response {
    let cart = cart::load(&session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let mut template = CheckoutTemplate {
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        address: String::new(),
        error: None,
        cart: CartView::from_cart(&cart, state.config().gateway.currency),
    };

    if let Some(user) = auth {
        template.email = user.email.to_string();

        // Best-effort prefill: a failed profile read logs and falls back to
        // blank fields, it never blocks checkout
        match UserRepository::new(state.pool()).get_profile(user.id).await {
            Ok(Some(profile)) => {
                template.name = profile.full_name.unwrap_or_default();
                template.phone = profile
                    .phone
                    .map(|p| p.as_str().to_owned())
                    .unwrap_or_default();
                template.address = profile.address.unwrap_or_default();
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Profile prefill failed, rendering blank form: {e}");
            }
        }
    }

    template.into_response()
}

/// Handle checkout form submission: validate, create the order, move to the
/// payment-method step.
///
/// The cart is NOT cleared here; clearing belongs to the payment branch so
/// a failed redirect cannot silently lose the cart before payment is
/// confirmed.
#[instrument(skip(state, session, auth, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let cart = cart::load(&session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    // Double-submit guard: an order already awaiting its payment choice
    // short-circuits to the payment page instead of creating a twin
    if let Some(pending) = get_pending(&session).await
        && pending.stage == CheckoutStage::AwaitingChoice
    {
        tracing::debug!(invoice_no = %pending.invoice_no, "Duplicate checkout submit ignored");
        return Redirect::to("/checkout/payment").into_response();
    }

    let currency = state.config().gateway.currency;
    let render_error = |form: &CheckoutForm, error: &CheckoutError| {
        CheckoutTemplate {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: Phone::format_partial(&form.phone),
            address: form.address.clone(),
            error: Some(error.user_message().to_owned()),
            cart: CartView::from_cart(&cart, currency),
        }
        .into_response()
    };

    // Validation failures surface inline with no side effects
    let customer = match validate(&form) {
        Ok(customer) => customer,
        Err(error) => return render_error(&form, &error),
    };

    // Order creation failure keeps the cart and the entered fields so the
    // shopper can retry
    let details = match submit_order(state.pool(), &customer, &cart, auth.map(|u| u.id)).await {
        Ok(details) => details,
        Err(error) => {
            tracing::error!("Order creation failed: {error}");
            return render_error(&form, &error);
        }
    };

    set_pending(
        &session,
        &PendingCheckout {
            invoice_no: details.order.invoice_no.clone(),
            stage: CheckoutStage::AwaitingChoice,
            total: details.order.total,
        },
    )
    .await;

    Redirect::to("/checkout/payment").into_response()
}

/// Display the payment method step for the pending order.
///
/// Reloads land on whatever the legal step is: the selection while
/// undecided, the invoice again while it is on screen.
#[instrument(skip(state, session))]
pub async fn payment_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let Some(pending) = get_pending(&session).await else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    match pending.stage {
        CheckoutStage::AwaitingChoice => Ok(PaymentTemplate {
            invoice_no: pending.invoice_no.to_string(),
            total: Price::new(pending.total, state.config().gateway.currency).display(),
        }
        .into_response()),
        CheckoutStage::CashInvoiceShown => {
            let invoice = cash_invoice(&state, &pending.invoice_no).await?;
            Ok(InvoiceTemplate { invoice }.into_response())
        }
        CheckoutStage::OnlineRedirecting | CheckoutStage::Done => {
            Ok(Redirect::to("/store").into_response())
        }
    }
}

/// Payment method form data.
#[derive(Debug, serde::Deserialize)]
pub struct PaymentMethodForm {
    pub method: String,
}

/// Confirm the payment method and branch the flow.
///
/// Online: mark the order `pending_online` (best-effort), clear the cart,
/// render the auto-submitting gateway form. Cash: mark `pending_cash`
/// (best-effort), show the invoice in place; the cart survives until the
/// invoice is dismissed.
#[instrument(skip(state, session))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaymentMethodForm>,
) -> Result<Response, AppError> {
    let Some(pending) = get_pending(&session).await else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    let Ok(method) = form.method.parse::<PaymentMethod>() else {
        return Err(AppError::BadRequest(format!(
            "unknown payment method: {}",
            form.method
        )));
    };

    let Ok(next_stage) = pending.stage.confirm(method) else {
        // Already decided (double click or replay): land on the legal step
        return Ok(Redirect::to("/checkout/payment").into_response());
    };

    // The order row already exists; a failed status update is logged and
    // never blocks the shopper
    record_payment_choice(state.pool(), &pending.invoice_no, method).await;

    let details = OrderRepository::new(state.pool())
        .get_by_invoice(&pending.invoice_no)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!(
                "pending order {} not found",
                pending.invoice_no
            ))
        })?;

    set_pending(
        &session,
        &PendingCheckout {
            invoice_no: pending.invoice_no.clone(),
            stage: next_stage,
            total: pending.total,
        },
    )
    .await;

    match method {
        PaymentMethod::Online => {
            // Cleared now: once the gateway form submits, the browser is gone
            cart::clear(&session).await;

            let redirect =
                build_redirect(&details, &state.config().gateway, &state.config().base_url);
            Ok(GatewayRedirectTemplate { redirect }.into_response())
        }
        PaymentMethod::Cash => {
            let invoice = build_invoice(
                &details,
                Some(method.pending_status()),
                state.config().gateway.currency,
            );
            Ok(InvoiceTemplate { invoice }.into_response())
        }
    }
}

/// Dismiss the cash invoice: clear the cart and return to the store with a
/// success toast.
#[instrument(skip(session))]
pub async fn close_invoice(session: Session) -> Response {
    let Some(pending) = get_pending(&session).await else {
        return Redirect::to("/store").into_response();
    };

    if pending.stage.dismiss().is_err() {
        return Redirect::to("/store").into_response();
    }

    cart::clear(&session).await;
    clear_pending(&session).await;

    Redirect::to("/store?success=1").into_response()
}

/// Build the invoice view for a pending cash order.
async fn cash_invoice(
    state: &AppState,
    invoice_no: &InvoiceNumber,
) -> Result<InvoiceView, AppError> {
    let details = OrderRepository::new(state.pool())
        .get_by_invoice(invoice_no)
        .await?
        .ok_or_else(|| AppError::Internal(format!("pending order {invoice_no} not found")))?;

    Ok(build_invoice(
        &details,
        Some(details.order.status),
        state.config().gateway.currency,
    ))
}
