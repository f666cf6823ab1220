//! Checkout workflow: form validation, order submission, and the
//! payment-method stage machine.
//!
//! Checkout is the only multi-step flow in the application. Its shape:
//!
//! 1. Validate the contact form (no side effects on failure).
//! 2. Create the order (one repository call; the cart is NOT cleared here).
//! 3. Payment-method branch: online clears the cart and hands off to the
//!    gateway; cash shows the invoice in place and clears the cart on
//!    dismissal.
//!
//! Payment-status updates after order creation are best-effort: the order
//! row already exists, so a failed update costs a stale status label, not a
//! lost order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use kingsway_core::{Email, InvoiceNumber, PaymentMethod, Phone, UserId};

use crate::db::RepositoryError;
use crate::db::orders::{CustomerDetails, OrderDetails, OrderRepository};
use crate::models::cart::Cart;

/// Raw checkout form input, exactly as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Name field is empty.
    #[error("missing name")]
    MissingName,

    /// Email field is empty or malformed.
    #[error("invalid email")]
    InvalidEmail,

    /// Phone field is empty or not in canonical format.
    #[error("invalid phone")]
    InvalidPhone,

    /// Address field is empty.
    #[error("missing address")]
    MissingAddress,

    /// Submission with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Order creation failed.
    #[error("order creation failed: {0}")]
    Service(#[from] RepositoryError),
}

impl CheckoutError {
    /// Message shown to the shopper, inline for field errors and as a
    /// banner for service errors.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingName => "Please enter your full name.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::InvalidPhone => "Please enter your phone number as NN-NNN-NNNN.",
            Self::MissingAddress => "Please enter your delivery address.",
            Self::EmptyCart => "Your cart is empty.",
            Self::Service(_) => {
                "Something went wrong while placing your order. Please try again."
            }
        }
    }
}

/// Validate the checkout form and produce the customer snapshot.
///
/// Checks fields in display order and reports the first failure, so the
/// shopper fixes one thing at a time. The phone is normalized through
/// [`Phone::format_partial`] first: digits typed without separators are
/// accepted and canonicalized.
///
/// No side effects; callers only reach the order-creation step with an `Ok`
/// value in hand.
///
/// # Errors
///
/// Returns the first failing field's `CheckoutError`.
pub fn validate(form: &CheckoutForm) -> Result<CustomerDetails, CheckoutError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(CheckoutError::MissingName);
    }

    let email = Email::parse(form.email.trim()).map_err(|_| CheckoutError::InvalidEmail)?;

    let phone = Phone::parse(&Phone::format_partial(&form.phone))
        .map_err(|_| CheckoutError::InvalidPhone)?;

    let address = form.address.trim();
    if address.is_empty() {
        return Err(CheckoutError::MissingAddress);
    }

    Ok(CustomerDetails {
        name: name.to_owned(),
        email,
        phone,
        address: address.to_owned(),
    })
}

/// Create the order from validated details and the current cart.
///
/// Exactly one repository call per invocation; the cart is left untouched
/// so a failure lets the shopper retry without re-entering anything.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` when there is nothing to buy, or
/// `CheckoutError::Service` when persistence fails.
#[instrument(skip(pool, customer, cart), fields(item_count = cart.item_count()))]
pub async fn submit(
    pool: &PgPool,
    customer: &CustomerDetails,
    cart: &Cart,
    user_id: Option<UserId>,
) -> Result<OrderDetails, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let repo = OrderRepository::new(pool);
    let details = repo
        .create(customer, cart.items(), cart.total(), user_id)
        .await?;

    tracing::info!(
        invoice_no = %details.order.invoice_no,
        total = %details.order.total,
        "Order created"
    );

    Ok(details)
}

/// Record the shopper's payment choice on the order. Best-effort.
///
/// Failure is logged and swallowed: blocking the flow here would strand a
/// payable order behind a cosmetic status, since the order row already
/// exists from [`submit`].
#[instrument(skip(pool))]
pub async fn record_payment_choice(
    pool: &PgPool,
    invoice_no: &InvoiceNumber,
    method: PaymentMethod,
) {
    let repo = OrderRepository::new(pool);
    if let Err(e) = repo.update_status(invoice_no, method.pending_status()).await {
        tracing::warn!(
            %invoice_no,
            method = method.as_str(),
            "Payment status update failed (continuing): {e}"
        );
    }
}

// =============================================================================
// Payment-method stage machine
// =============================================================================

/// Where the shopper is in the payment-method step.
///
/// Stored in the session beside the pending invoice number, so a reload
/// lands back on the legal step instead of creating a second order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    /// Order created, payment method not yet confirmed. Default selection
    /// is online.
    AwaitingChoice,
    /// Gateway form rendered; the browser is leaving the application.
    OnlineRedirecting,
    /// Cash chosen; the invoice is on screen awaiting dismissal.
    CashInvoiceShown,
    /// Flow finished.
    Done,
}

/// Illegal stage transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    /// Confirm after the method was already chosen.
    #[error("payment method already chosen")]
    AlreadyDecided,
    /// Dismiss without a visible invoice.
    #[error("no invoice is being shown")]
    NothingToDismiss,
}

impl CheckoutStage {
    /// Confirm the payment method.
    ///
    /// # Errors
    ///
    /// Returns `StageError::AlreadyDecided` unless the stage is
    /// [`CheckoutStage::AwaitingChoice`].
    pub const fn confirm(self, method: PaymentMethod) -> Result<Self, StageError> {
        match self {
            Self::AwaitingChoice => Ok(match method {
                PaymentMethod::Online => Self::OnlineRedirecting,
                PaymentMethod::Cash => Self::CashInvoiceShown,
            }),
            Self::OnlineRedirecting | Self::CashInvoiceShown | Self::Done => {
                Err(StageError::AlreadyDecided)
            }
        }
    }

    /// Dismiss the cash invoice.
    ///
    /// # Errors
    ///
    /// Returns `StageError::NothingToDismiss` unless the stage is
    /// [`CheckoutStage::CashInvoiceShown`].
    pub const fn dismiss(self) -> Result<Self, StageError> {
        match self {
            Self::CashInvoiceShown => Ok(Self::Done),
            Self::AwaitingChoice | Self::OnlineRedirecting | Self::Done => {
                Err(StageError::NothingToDismiss)
            }
        }
    }
}

/// The in-flight checkout stored in the session between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCheckout {
    pub invoice_no: InvoiceNumber,
    pub stage: CheckoutStage,
    /// Total carried for the payment page (display only).
    pub total: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            name: "Tashi Dorji".to_string(),
            email: "tashi@example.com".to_string(),
            phone: "70-123-4567".to_string(),
            address: "12 Hilltop Road\nUpper Market\nKingsway".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let customer = validate(&valid_form()).unwrap();
        assert_eq!(customer.name, "Tashi Dorji");
        assert_eq!(customer.email.as_str(), "tashi@example.com");
        assert_eq!(customer.phone.as_str(), "70-123-4567");
        assert!(customer.address.starts_with("12 Hilltop Road"));
    }

    #[test]
    fn test_validate_normalizes_unseparated_phone() {
        // Digits typed without separators canonicalize before validation
        let mut form = valid_form();
        form.phone = "701234567".to_string();

        let customer = validate(&form).unwrap();
        assert_eq!(customer.phone.as_str(), "70-123-4567");
    }

    #[test]
    fn test_validate_rejects_each_missing_field() {
        // The validation gate: no Ok value, so the order-creation call is
        // unreachable for any of these inputs.
        let mut form = valid_form();
        form.name = "   ".to_string();
        assert!(matches!(validate(&form), Err(CheckoutError::MissingName)));

        let mut form = valid_form();
        form.email = String::new();
        assert!(matches!(validate(&form), Err(CheckoutError::InvalidEmail)));

        let mut form = valid_form();
        form.email = "not-an-email".to_string();
        assert!(matches!(validate(&form), Err(CheckoutError::InvalidEmail)));

        let mut form = valid_form();
        form.phone = String::new();
        assert!(matches!(validate(&form), Err(CheckoutError::InvalidPhone)));

        let mut form = valid_form();
        form.phone = "70-123".to_string();
        assert!(matches!(validate(&form), Err(CheckoutError::InvalidPhone)));

        let mut form = valid_form();
        form.address = "\n  \n".to_string();
        assert!(matches!(
            validate(&form),
            Err(CheckoutError::MissingAddress)
        ));
    }

    #[test]
    fn test_validate_reports_first_failing_field() {
        let form = CheckoutForm::default();
        // Everything is empty; the name message wins
        assert!(matches!(validate(&form), Err(CheckoutError::MissingName)));
    }

    #[test]
    fn test_stage_confirm_online() {
        let stage = CheckoutStage::AwaitingChoice
            .confirm(PaymentMethod::Online)
            .unwrap();
        assert_eq!(stage, CheckoutStage::OnlineRedirecting);
    }

    #[test]
    fn test_stage_confirm_cash_then_dismiss() {
        let stage = CheckoutStage::AwaitingChoice
            .confirm(PaymentMethod::Cash)
            .unwrap();
        assert_eq!(stage, CheckoutStage::CashInvoiceShown);

        let stage = stage.dismiss().unwrap();
        assert_eq!(stage, CheckoutStage::Done);
    }

    #[test]
    fn test_stage_rejects_double_confirm() {
        for stage in [
            CheckoutStage::OnlineRedirecting,
            CheckoutStage::CashInvoiceShown,
            CheckoutStage::Done,
        ] {
            assert_eq!(
                stage.confirm(PaymentMethod::Online),
                Err(StageError::AlreadyDecided)
            );
            assert_eq!(
                stage.confirm(PaymentMethod::Cash),
                Err(StageError::AlreadyDecided)
            );
        }
    }

    #[test]
    fn test_stage_rejects_stray_dismiss() {
        for stage in [
            CheckoutStage::AwaitingChoice,
            CheckoutStage::OnlineRedirecting,
            CheckoutStage::Done,
        ] {
            assert_eq!(stage.dismiss(), Err(StageError::NothingToDismiss));
        }
    }

    #[test]
    fn test_error_messages_are_field_specific() {
        assert!(CheckoutError::MissingName.user_message().contains("name"));
        assert!(CheckoutError::InvalidEmail.user_message().contains("email"));
        assert!(
            CheckoutError::InvalidPhone
                .user_message()
                .contains("NN-NNN-NNNN")
        );
        assert!(
            CheckoutError::MissingAddress
                .user_message()
                .contains("address")
        );
    }
}
