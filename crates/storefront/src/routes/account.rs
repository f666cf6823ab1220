//! Account route handlers: overview, profile, and order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;

use kingsway_core::{InvoiceNumber, Phone, Price};

use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::user::Profile;
use crate::services::invoice::{InvoiceView, StatusChipView, build_invoice};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Order summary row for the history table.
#[derive(Clone)]
pub struct OrderSummaryView {
    pub invoice_no: String,
    pub date: String,
    pub total: String,
    pub status: StatusChipView,
}

// =============================================================================
// Form / Query Types
// =============================================================================

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: String,
    pub address: String,
}

/// Query parameters for the account overview.
#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub saved: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub error: Option<String>,
    pub show_saved: bool,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderSummaryView>,
}

/// Order detail template (invoice view with status chip).
#[derive(Template, WebTemplate)]
#[template(path = "account/order_detail.html")]
pub struct OrderDetailTemplate {
    pub invoice: InvoiceView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the account overview with the profile form.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<AccountQuery>,
) -> Result<impl IntoResponse> {
    let profile = UserRepository::new(state.pool())
        .get_profile(user.id)
        .await?
        .unwrap_or_default();

    Ok(AccountTemplate {
        email: user.email.to_string(),
        full_name: profile.full_name.unwrap_or_default(),
        phone: profile
            .phone
            .map(|p| p.as_str().to_owned())
            .unwrap_or_default(),
        address: profile.address.unwrap_or_default(),
        error: None,
        show_saved: query.saved.as_deref() == Some("1"),
    })
}

/// Save the profile used for checkout prefill.
#[instrument(skip(state, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    // An empty phone clears the field; anything else must canonicalize
    let phone = match form.phone.trim() {
        "" => None,
        raw => match Phone::parse(&Phone::format_partial(raw)) {
            Ok(phone) => Some(phone),
            Err(_) => {
                return Ok(AccountTemplate {
                    email: user.email.to_string(),
                    full_name: form.full_name,
                    phone: Phone::format_partial(raw),
                    address: form.address,
                    error: Some("Please enter your phone number as NN-NNN-NNNN.".to_string()),
                    show_saved: false,
                }
                .into_response());
            }
        },
    };

    let profile = Profile {
        full_name: Some(form.full_name.trim().to_owned()).filter(|s| !s.is_empty()),
        phone,
        address: Some(form.address.trim().to_owned()).filter(|s| !s.is_empty()),
    };

    UserRepository::new(state.pool())
        .upsert_profile(user.id, &profile)
        .await?;

    Ok(Redirect::to("/account?saved=1").into_response())
}

/// Display the shopper's order history.
#[instrument(skip(state))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let currency = state.config().gateway.currency;

    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?
        .into_iter()
        .map(|order| OrderSummaryView {
            invoice_no: order.invoice_no.to_string(),
            date: order.created_at.format("%d %b %Y").to_string(),
            total: Price::new(order.total, currency).display(),
            status: StatusChipView::from_status(order.status),
        })
        .collect();

    Ok(OrdersTemplate { orders })
}

/// Display one order as its invoice view.
#[instrument(skip(state))]
pub async fn order_detail(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(invoice): Path<String>,
) -> Result<impl IntoResponse> {
    let invoice_no = InvoiceNumber::new(invoice);

    let details = OrderRepository::new(state.pool())
        .get_for_user(user.id, &invoice_no)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {invoice_no}")))?;

    let invoice = build_invoice(
        &details,
        Some(details.order.status),
        state.config().gateway.currency,
    );

    Ok(OrderDetailTemplate { invoice })
}
