//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in one session slot and is re-persisted after
//! every mutation; see [`crate::models::cart`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;

use kingsway_core::{CurrencyCode, Price, ProductId};

use crate::models::cart::{self, Cart};
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: i32,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Build the display cart from the domain cart.
    #[must_use]
    pub fn from_cart(cart: &Cart, currency: CurrencyCode) -> Self {
        let money = |amount| Price::new(amount, currency).display();

        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product_id.as_i32(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: money(item.unit_price),
                    line_price: money(item.line_total()),
                    image: item.image.clone(),
                })
                .collect(),
            subtotal: money(cart.total()),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = cart::load(&session).await;

    CartShowTemplate {
        cart: CartView::from_cart(&cart, state.config().gateway.currency),
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// Returns the cart count badge with an HTMX trigger so other fragments
/// refresh themselves.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let product = match state.catalog().product(ProductId::new(form.product_id)).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Html("<span class=\"form-error\">This product is no longer available</span>"),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to load product for cart add: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"form-error\">Error adding to cart</span>"),
            )
                .into_response();
        }
    };

    let mut cart = cart::load(&session).await;
    cart.add(&product);
    cart::persist(&session, &cart).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response()
}

/// Update cart item quantity (HTMX).
///
/// The quantity controls never send a value below 1; a 0 arriving anyway
/// (e.g. a hand-edited request) removes the item, keeping the floor
/// invariant.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id);

    let mut cart = cart::load(&session).await;
    if form.quantity == 0 {
        cart.remove(product_id);
    } else {
        cart.set_quantity(product_id, form.quantity);
    }
    cart::persist(&session, &cart).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_cart(&cart, state.config().gateway.currency),
        },
    )
        .into_response()
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let mut cart = cart::load(&session).await;
    cart.remove(ProductId::new(form.product_id));
    cart::persist(&session, &cart).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_cart(&cart, state.config().gateway.currency),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = cart::load(&session).await;

    CartCountTemplate {
        count: cart.item_count(),
    }
}
