//! Shared helpers for the Kingsway storefront integration tests.
//!
//! The tests in `tests/` exercise the checkout workflow end-to-end at the
//! crate-API level (cart, validation, payment stage machine, gateway
//! payload, invoice rendering) without a database. The live-server smoke
//! test is gated on `INTEGRATION_TEST_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use kingsway_core::{Email, InvoiceNumber, OrderId, OrderStatus, Phone, ProductId};
use kingsway_storefront::db::catalog::Product;
use kingsway_storefront::db::orders::{CustomerDetails, OrderDetails, OrderLine, OrderRecord};
use kingsway_storefront::models::cart::Cart;

/// A catalog product for cart tests.
#[must_use]
pub fn product(id: i32, name: &str, price: Decimal) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: String::new(),
        price,
        image: None,
        category: "books".to_string(),
        active: true,
    }
}

/// The two-product cart used by the end-to-end scenarios: one unit of the
/// workbook, three of the cards.
#[must_use]
pub fn scenario_cart() -> Cart {
    let workbook = product(1, "Algebra Workbook", Decimal::new(1550, 2));
    let cards = product(2, "Revision Cards", Decimal::new(850, 2));

    let mut cart = Cart::default();
    cart.add(&workbook);
    cart.add(&cards);
    cart.add(&cards);
    cart.add(&cards);
    cart
}

/// Order details as the order creation service would return them for
/// [`scenario_cart`].
///
/// # Panics
///
/// Panics if the fixture timestamp stops being valid, which would be a bug
/// in the fixtures themselves.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn scenario_order(cart: &Cart, customer: CustomerDetails) -> OrderDetails {
    OrderDetails {
        order: OrderRecord {
            id: OrderId::new(1),
            invoice_no: InvoiceNumber::new("INV-20260807-0042".to_string()),
            status: OrderStatus::Pending,
            customer,
            total: cart.total(),
            created_at: Utc.with_ymd_and_hms(2026, 8, 7, 10, 30, 0).unwrap(),
        },
        lines: cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                image: item.image.clone(),
            })
            .collect(),
    }
}

/// The valid customer used across scenarios.
///
/// # Panics
///
/// Panics if the fixture contact details stop parsing, which would be a bug
/// in the fixtures themselves.
#[must_use]
pub fn scenario_customer() -> CustomerDetails {
    CustomerDetails {
        name: "Tashi Dorji".to_string(),
        email: Email::parse("tashi@example.com").unwrap_or_else(|_| unreachable!()),
        phone: Phone::parse("70-123-4567").unwrap_or_else(|_| unreachable!()),
        address: "12 Hilltop Road\nUpper Market\nKingsway".to_string(),
    }
}
