//! External payment gateway redirect construction.
//!
//! The gateway is a hosted payment page: checkout renders an auto-submitting
//! POST form whose fields are built here, the browser leaves the
//! application, and the shopper later lands on `/payment/success` or
//! `/payment/cancel`. No response is awaited; a blocked submission simply
//! never reaches either callback route (accepted external-dependency risk,
//! no retries at this layer).

use rust_decimal::Decimal;

use crate::config::PaymentGatewayConfig;
use crate::db::orders::{OrderDetails, OrderLine};

/// The rendered redirect: target endpoint plus ordered form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRedirect {
    pub endpoint: String,
    pub fields: Vec<(&'static str, String)>,
}

/// Build the gateway payload for an order.
///
/// Pure: same order + config always produce the same field list, in a fixed
/// order (some gateways sign the payload positionally).
#[must_use]
pub fn build_redirect(
    order: &OrderDetails,
    config: &PaymentGatewayConfig,
    base_url: &str,
) -> GatewayRedirect {
    let (first_name, last_name) = split_name(&order.order.customer.name);
    let base = base_url.trim_end_matches('/');

    let fields = vec![
        ("merchant_id", config.merchant_id.clone()),
        ("return_url", format!("{base}/payment/success")),
        ("cancel_url", format!("{base}/payment/cancel")),
        ("notify_url", format!("{base}/payment/notify")),
        ("first_name", first_name),
        ("last_name", last_name),
        ("email", order.order.customer.email.to_string()),
        ("phone", order.order.customer.phone.to_string()),
        ("address", order.order.customer.address.clone()),
        ("city", extract_city(&order.order.customer.address)),
        ("country", config.country.clone()),
        ("order_id", order.order.invoice_no.to_string()),
        ("items", flatten_items(&order.lines)),
        ("currency", config.currency.code().to_string()),
        ("amount", format_amount(order.order.total)),
    ];

    GatewayRedirect {
        endpoint: config.endpoint.clone(),
        fields,
    }
}

/// Split a full name into (first, last) on the first whitespace.
///
/// A single-word name yields an empty last name; the gateway accepts that.
fn split_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_owned(), rest.trim().to_owned()),
        None => (trimmed.to_owned(), String::new()),
    }
}

/// Best-effort city: the last non-empty line of the address.
fn extract_city(address: &str) -> String {
    address
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .unwrap_or_default()
        .to_owned()
}

/// Flatten line items into a gateway description, e.g.
/// `Algebra Workbook x 2, Revision Cards x 1`.
fn flatten_items(lines: &[OrderLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{} x {}", line.name, line.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Amount with exactly two decimal places, no currency symbol.
fn format_amount(total: Decimal) -> String {
    format!("{:.2}", total.round_dp(2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kingsway_core::{
        CurrencyCode, Email, InvoiceNumber, OrderId, OrderStatus, Phone, ProductId,
    };
    use rust_decimal::Decimal;

    use crate::db::orders::{CustomerDetails, OrderRecord};

    fn test_config() -> PaymentGatewayConfig {
        PaymentGatewayConfig {
            merchant_id: "M-1001".to_string(),
            endpoint: "https://pay.example.com/process".to_string(),
            currency: CurrencyCode::USD,
            country: "US".to_string(),
        }
    }

    fn test_order() -> OrderDetails {
        OrderDetails {
            order: OrderRecord {
                id: OrderId::new(1),
                invoice_no: InvoiceNumber::new("INV-20260807-0042".to_string()),
                status: OrderStatus::Pending,
                customer: CustomerDetails {
                    name: "Tashi Dorji".to_string(),
                    email: Email::parse("tashi@example.com").unwrap(),
                    phone: Phone::parse("70-123-4567").unwrap(),
                    address: "12 Hilltop Road\nUpper Market\nKingsway".to_string(),
                },
                total: Decimal::new(4550, 2),
                created_at: Utc::now(),
            },
            lines: vec![
                OrderLine {
                    product_id: ProductId::new(1),
                    name: "Algebra Workbook".to_string(),
                    quantity: 2,
                    unit_price: Decimal::new(1525, 2),
                    image: None,
                },
                OrderLine {
                    product_id: ProductId::new(2),
                    name: "Revision Cards".to_string(),
                    quantity: 1,
                    unit_price: Decimal::new(1500, 2),
                    image: None,
                },
            ],
        }
    }

    fn field<'a>(redirect: &'a GatewayRedirect, key: &str) -> &'a str {
        redirect
            .fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("missing field {key}"))
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("Tashi Dorji"),
            ("Tashi".to_string(), "Dorji".to_string())
        );
        assert_eq!(
            split_name("Anna Maria van der Berg"),
            ("Anna".to_string(), "Maria van der Berg".to_string())
        );
        assert_eq!(split_name("Cher"), ("Cher".to_string(), String::new()));
        assert_eq!(
            split_name("  Tashi  Dorji  "),
            ("Tashi".to_string(), "Dorji".to_string())
        );
    }

    #[test]
    fn test_extract_city_last_non_empty_line() {
        assert_eq!(extract_city("12 Hilltop Road\nUpper Market\nKingsway"), "Kingsway");
        assert_eq!(extract_city("12 Hilltop Road\nKingsway\n\n  \n"), "Kingsway");
        assert_eq!(extract_city("Single line"), "Single line");
        assert_eq!(extract_city(""), "");
    }

    #[test]
    fn test_flatten_items() {
        let order = test_order();
        assert_eq!(
            flatten_items(&order.lines),
            "Algebra Workbook x 2, Revision Cards x 1"
        );
        assert_eq!(flatten_items(&[]), "");
    }

    #[test]
    fn test_format_amount_two_decimals() {
        assert_eq!(format_amount(Decimal::new(4550, 2)), "45.50");
        assert_eq!(format_amount(Decimal::new(45, 0)), "45.00");
        assert_eq!(format_amount(Decimal::new(45999, 3)), "46.00");
    }

    #[test]
    fn test_build_redirect_payload() {
        let redirect = build_redirect(&test_order(), &test_config(), "https://shop.example.com/");

        assert_eq!(redirect.endpoint, "https://pay.example.com/process");
        assert_eq!(field(&redirect, "merchant_id"), "M-1001");
        assert_eq!(
            field(&redirect, "return_url"),
            "https://shop.example.com/payment/success"
        );
        assert_eq!(
            field(&redirect, "cancel_url"),
            "https://shop.example.com/payment/cancel"
        );
        assert_eq!(
            field(&redirect, "notify_url"),
            "https://shop.example.com/payment/notify"
        );
        assert_eq!(field(&redirect, "first_name"), "Tashi");
        assert_eq!(field(&redirect, "last_name"), "Dorji");
        assert_eq!(field(&redirect, "email"), "tashi@example.com");
        assert_eq!(field(&redirect, "phone"), "70-123-4567");
        assert_eq!(field(&redirect, "city"), "Kingsway");
        assert_eq!(field(&redirect, "country"), "US");
        assert_eq!(field(&redirect, "order_id"), "INV-20260807-0042");
        assert_eq!(
            field(&redirect, "items"),
            "Algebra Workbook x 2, Revision Cards x 1"
        );
        assert_eq!(field(&redirect, "currency"), "USD");
        assert_eq!(field(&redirect, "amount"), "45.50");
    }

    #[test]
    fn test_build_redirect_field_order_is_stable() {
        let redirect = build_redirect(&test_order(), &test_config(), "https://shop.example.com");
        let keys: Vec<&str> = redirect.fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            [
                "merchant_id",
                "return_url",
                "cancel_url",
                "notify_url",
                "first_name",
                "last_name",
                "email",
                "phone",
                "address",
                "city",
                "country",
                "order_id",
                "items",
                "currency",
                "amount",
            ]
        );
    }

    #[test]
    fn test_build_redirect_is_deterministic() {
        let a = build_redirect(&test_order(), &test_config(), "https://shop.example.com");
        let b = build_redirect(&test_order(), &test_config(), "https://shop.example.com");
        assert_eq!(a, b);
    }
}
