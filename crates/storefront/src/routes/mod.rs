//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Directory
//! GET  /subjects               - Subject directory
//! GET  /tutors                 - Tutor directory
//! GET  /news                   - News listing
//! GET  /news/{slug}            - News post
//! GET  /pages/{slug}           - Static page (about, terms)
//!
//! # Store
//! GET  /store                  - Catalog (category filter, ?success=1 toast)
//! GET  /store/{id}             - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count fragment)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Contact/delivery form (prefilled when signed in)
//! POST /checkout               - Validate + create order
//! GET  /checkout/payment       - Payment method selection
//! POST /checkout/payment       - Confirm method (online -> gateway, cash -> invoice)
//! POST /checkout/invoice/close - Dismiss cash invoice (clears cart)
//!
//! # Payment gateway callbacks
//! GET  /payment/success        - Gateway return route
//! GET  /payment/cancel         - Gateway cancel route
//! POST /payment/notify         - Gateway server callback (logged)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Account overview + profile form
//! POST /account/profile        - Save profile
//! GET  /account/orders         - Order history
//! GET  /account/orders/{invoice} - Order detail (invoice view)
//!
//! # Preferences
//! POST /theme/toggle           - Flip light/dark theme
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod news;
pub mod pages;
pub mod payment;
pub mod store;
pub mod subjects;
pub mod theme;
pub mod tutors;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::form_page).post(checkout::submit))
        .route(
            "/payment",
            get(checkout::payment_page).post(checkout::confirm_payment),
        )
        .route("/invoice/close", post(checkout::close_invoice))
        .layer(form_rate_limiter())
}

/// Create the payment callback routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/success", get(payment::success))
        .route("/cancel", get(payment::cancel))
        .route("/notify", post(payment::notify))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route("/orders", get(account::orders))
        .route("/orders/{invoice}", get(account::order_detail))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Directory
        .route("/subjects", get(subjects::index))
        .route("/tutors", get(tutors::index))
        .route("/news", get(news::index))
        .route("/news/{slug}", get(news::show))
        .route("/pages/{slug}", get(pages::show))
        // Store
        .route("/store", get(store::index))
        .route("/store/{id}", get(store::show))
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .nest("/checkout", checkout_routes())
        // Payment gateway callbacks
        .nest("/payment", payment_routes())
        // Account
        .nest("/account", account_routes())
        // Auth
        .nest("/auth", auth_routes())
        // Preferences
        .route("/theme/toggle", post(theme::toggle))
}
