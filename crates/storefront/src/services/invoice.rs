//! Invoice/receipt view construction.
//!
//! A pure transformation from order data to the printable invoice view.
//! Used by both the cash-path receipt shown right after checkout and the
//! account order-history detail page. Deterministic: the same order always
//! renders the same document.

use rust_decimal::Decimal;

use kingsway_core::{CurrencyCode, OrderStatus, Price, StatusIcon};

use crate::db::orders::OrderDetails;

/// One rendered invoice line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLineView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Status chip rendered on the invoice and in order history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChipView {
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

impl StatusChipView {
    /// Resolve a chip through the status taxonomy.
    #[must_use]
    pub const fn from_status(status: OrderStatus) -> Self {
        let presentation = status.presentation();
        Self {
            label: presentation.label,
            color: presentation.color.css_class(),
            icon: icon_class(presentation.icon),
        }
    }
}

/// CSS class for a status icon kind.
const fn icon_class(icon: StatusIcon) -> &'static str {
    match icon {
        StatusIcon::Check => "icon-check",
        StatusIcon::Bag => "icon-bag",
        StatusIcon::Cross => "icon-cross",
        StatusIcon::CreditCard => "icon-card",
        StatusIcon::Clock => "icon-clock",
    }
}

/// The printable invoice document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceView {
    pub invoice_no: String,
    pub date: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub address_lines: Vec<String>,
    pub lines: Vec<InvoiceLineView>,
    /// Grand total, recomputed from the lines as a display cross-check.
    pub total: String,
    /// Absent status renders no chip.
    pub status: Option<StatusChipView>,
}

/// Build the invoice view for an order.
///
/// Line totals and the grand total are recomputed here from unit prices and
/// quantities, independent of the total stored on the order; a mismatch is
/// logged but the recomputed value is what renders.
#[must_use]
pub fn build_invoice(
    details: &OrderDetails,
    status: Option<OrderStatus>,
    currency: CurrencyCode,
) -> InvoiceView {
    let money = |amount: Decimal| Price::new(amount, currency).display();

    let mut computed_total = Decimal::ZERO;
    let lines = details
        .lines
        .iter()
        .map(|line| {
            let line_total = line.unit_price * Decimal::from(line.quantity);
            computed_total += line_total;
            InvoiceLineView {
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: money(line.unit_price),
                line_total: money(line_total),
            }
        })
        .collect();

    if computed_total != details.order.total {
        tracing::warn!(
            invoice_no = %details.order.invoice_no,
            stored = %details.order.total,
            computed = %computed_total,
            "Stored order total differs from recomputed total"
        );
    }

    InvoiceView {
        invoice_no: details.order.invoice_no.to_string(),
        date: details.order.created_at.format("%d %b %Y").to_string(),
        customer_name: details.order.customer.name.clone(),
        customer_email: details.order.customer.email.to_string(),
        customer_phone: details.order.customer.phone.to_string(),
        address_lines: details
            .order
            .customer
            .address
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect(),
        lines,
        total: money(computed_total),
        status: status.map(StatusChipView::from_status),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kingsway_core::{Email, InvoiceNumber, OrderId, Phone, ProductId};

    use crate::db::orders::{CustomerDetails, OrderLine, OrderRecord};

    fn test_order(stored_total: Decimal) -> OrderDetails {
        OrderDetails {
            order: OrderRecord {
                id: OrderId::new(9),
                invoice_no: InvoiceNumber::new("INV-20260807-0042".to_string()),
                status: OrderStatus::PendingCash,
                customer: CustomerDetails {
                    name: "Tashi Dorji".to_string(),
                    email: Email::parse("tashi@example.com").unwrap(),
                    phone: Phone::parse("70-123-4567").unwrap(),
                    address: "12 Hilltop Road\n\nKingsway".to_string(),
                },
                total: stored_total,
                created_at: Utc.with_ymd_and_hms(2026, 8, 7, 10, 30, 0).unwrap(),
            },
            lines: vec![
                OrderLine {
                    product_id: ProductId::new(1),
                    name: "Algebra Workbook".to_string(),
                    quantity: 3,
                    unit_price: Decimal::new(1050, 2), // 10.50
                    image: None,
                },
                OrderLine {
                    product_id: ProductId::new(2),
                    name: "Revision Cards".to_string(),
                    quantity: 1,
                    unit_price: Decimal::new(499, 2), // 4.99
                    image: None,
                },
            ],
        }
    }

    #[test]
    fn test_line_totals_and_grand_total() {
        let invoice = build_invoice(&test_order(Decimal::new(3649, 2)), None, CurrencyCode::USD);

        assert_eq!(invoice.lines.len(), 2);
        assert_eq!(invoice.lines[0].unit_price, "$10.50");
        assert_eq!(invoice.lines[0].line_total, "$31.50");
        assert_eq!(invoice.lines[1].line_total, "$4.99");
        // 31.50 + 4.99
        assert_eq!(invoice.total, "$36.49");
    }

    #[test]
    fn test_total_recomputed_independently_of_stored_value() {
        // A wrong stored total does not change what renders
        let invoice = build_invoice(&test_order(Decimal::new(9999, 2)), None, CurrencyCode::USD);
        assert_eq!(invoice.total, "$36.49");
    }

    #[test]
    fn test_header_fields() {
        let invoice = build_invoice(&test_order(Decimal::new(3649, 2)), None, CurrencyCode::USD);

        assert_eq!(invoice.invoice_no, "INV-20260807-0042");
        assert_eq!(invoice.date, "07 Aug 2026");
        assert_eq!(invoice.customer_name, "Tashi Dorji");
        assert_eq!(invoice.customer_phone, "70-123-4567");
        // Blank address lines are dropped
        assert_eq!(invoice.address_lines, vec!["12 Hilltop Road", "Kingsway"]);
    }

    #[test]
    fn test_absent_status_renders_no_chip() {
        let invoice = build_invoice(&test_order(Decimal::new(3649, 2)), None, CurrencyCode::USD);
        assert!(invoice.status.is_none());
    }

    #[test]
    fn test_status_resolved_through_taxonomy() {
        let invoice = build_invoice(
            &test_order(Decimal::new(3649, 2)),
            Some(OrderStatus::PendingCash),
            CurrencyCode::USD,
        );
        let chip = invoice.status.unwrap();
        assert_eq!(chip.label, "Order Unpaid");
        assert_eq!(chip.color, "warning");
        assert_eq!(chip.icon, "icon-card");
    }

    #[test]
    fn test_deterministic() {
        let order = test_order(Decimal::new(3649, 2));
        let a = build_invoice(&order, Some(OrderStatus::Completed), CurrencyCode::USD);
        let b = build_invoice(&order, Some(OrderStatus::Completed), CurrencyCode::USD);
        assert_eq!(a, b);
    }
}
