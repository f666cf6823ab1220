//! Order repository: order headers and line items.
//!
//! Order creation persists the header and all line items in a single
//! transaction, so a reader never observes a header without its items. The
//! invoice number is allocated here (date-prefixed random suffix, UNIQUE
//! constrained, retried on collision).

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use kingsway_core::{Email, InvoiceNumber, OrderId, OrderStatus, Phone, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartItem;

/// Attempts at allocating a unique invoice number before giving up.
const INVOICE_ALLOCATION_ATTEMPTS: u32 = 3;

/// The shopper contact details captured at checkout, snapshotted onto the
/// order.
#[derive(Debug, Clone)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub address: String,
}

/// An order header.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: OrderId,
    pub invoice_no: InvoiceNumber,
    pub status: OrderStatus,
    pub customer: CustomerDetails,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A purchased line item.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub image: Option<String>,
}

/// A complete order: header plus line items.
///
/// Created exactly once per checkout submission and never mutated by the
/// client afterwards; the server-side status may change independently.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: OrderRecord,
    pub lines: Vec<OrderLine>,
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderHeaderRow {
    id: OrderId,
    invoice_no: InvoiceNumber,
    status: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_address: String,
    total: Decimal,
    created_at: DateTime<Utc>,
}

impl OrderHeaderRow {
    fn into_record(self) -> Result<OrderRecord, RepositoryError> {
        let email = Email::parse(&self.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order email in database: {e}"))
        })?;
        let phone = Phone::parse(&self.customer_phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order phone in database: {e}"))
        })?;

        Ok(OrderRecord {
            id: self.id,
            invoice_no: self.invoice_no,
            status: OrderStatus::parse(Some(&self.status)),
            customer: CustomerDetails {
                name: self.customer_name,
                email,
                phone,
                address: self.customer_address,
            },
            total: self.total,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    product_id: ProductId,
    name: String,
    quantity: i32,
    unit_price: Decimal,
    image: Option<String>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            quantity: u32::try_from(row.quantity).unwrap_or(1),
            unit_price: row.unit_price,
            image: row.image,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order: one header row plus one row per cart item, in a
    /// single transaction.
    ///
    /// The returned [`OrderDetails`] carries the freshly allocated invoice
    /// number. `user_id` links the order to an account when the shopper is
    /// signed in; guest checkout passes `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if persistence fails, including
    /// the unlikely case of exhausting invoice-number allocation attempts.
    #[instrument(skip(self, customer, items), fields(item_count = items.len()))]
    pub async fn create(
        &self,
        customer: &CustomerDetails,
        items: &[CartItem],
        total: Decimal,
        user_id: Option<UserId>,
    ) -> Result<OrderDetails, RepositoryError> {
        let mut last_err: Option<sqlx::Error> = None;

        for _ in 0..INVOICE_ALLOCATION_ATTEMPTS {
            let invoice_no = generate_invoice_number(Utc::now());

            match self
                .try_create(&invoice_no, customer, items, total, user_id)
                .await
            {
                Ok(details) => return Ok(details),
                Err(e) => {
                    if let sqlx::Error::Database(ref db_err) = e
                        && db_err.is_unique_violation()
                    {
                        tracing::debug!(%invoice_no, "Invoice number collision, retrying");
                        last_err = Some(e);
                        continue;
                    }
                    return Err(RepositoryError::Database(e));
                }
            }
        }

        Err(last_err.map_or_else(
            || RepositoryError::Conflict("invoice number allocation failed".to_owned()),
            RepositoryError::Database,
        ))
    }

    async fn try_create(
        &self,
        invoice_no: &InvoiceNumber,
        customer: &CustomerDetails,
        items: &[CartItem],
        total: Decimal,
        user_id: Option<UserId>,
    ) -> Result<OrderDetails, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let header: OrderHeaderRow = sqlx::query_as(
            r"
            INSERT INTO orders
                (invoice_no, status, user_id,
                 customer_name, customer_email, customer_phone, customer_address,
                 total)
            VALUES ($1, 'pending', $2, $3, $4, $5, $6, $7)
            RETURNING id, invoice_no, status,
                      customer_name, customer_email, customer_phone, customer_address,
                      total, created_at
            ",
        )
        .bind(invoice_no)
        .bind(user_id)
        .bind(&customer.name)
        .bind(customer.email.as_str())
        .bind(customer.phone.as_str())
        .bind(&customer.address)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r"
                INSERT INTO order_items
                    (order_id, product_id, name, quantity, unit_price, image)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(header.id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .bind(item.unit_price)
            .bind(item.image.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        // Corruption is impossible here: we just wrote validated values
        let order = header
            .into_record()
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

        let lines = items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                image: item.image.clone(),
            })
            .collect();

        Ok(OrderDetails { order, lines })
    }

    /// Fetch an order (header + lines) by invoice number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored contact details
    /// fail re-validation.
    #[instrument(skip(self))]
    pub async fn get_by_invoice(
        &self,
        invoice_no: &InvoiceNumber,
    ) -> Result<Option<OrderDetails>, RepositoryError> {
        let header: Option<OrderHeaderRow> = sqlx::query_as(
            r"
            SELECT id, invoice_no, status,
                   customer_name, customer_email, customer_phone, customer_address,
                   total, created_at
            FROM orders
            WHERE invoice_no = $1
            ",
        )
        .bind(invoice_no)
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let order = header.into_record()?;
        let lines = self.lines_for(order.id).await?;

        Ok(Some(OrderDetails { order, lines }))
    }

    /// Fetch an order by invoice number, scoped to its owning user.
    ///
    /// Returns `None` for orders that exist but belong to someone else (or
    /// to no account), so the account area cannot leak other shoppers'
    /// orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        invoice_no: &InvoiceNumber,
    ) -> Result<Option<OrderDetails>, RepositoryError> {
        let header: Option<OrderHeaderRow> = sqlx::query_as(
            r"
            SELECT id, invoice_no, status,
                   customer_name, customer_email, customer_phone, customer_address,
                   total, created_at
            FROM orders
            WHERE invoice_no = $1 AND user_id = $2
            ",
        )
        .bind(invoice_no)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let order = header.into_record()?;
        let lines = self.lines_for(order.id).await?;

        Ok(Some(OrderDetails { order, lines }))
    }

    /// List a user's order headers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderRecord>, RepositoryError> {
        let rows: Vec<OrderHeaderRow> = sqlx::query_as(
            r"
            SELECT id, invoice_no, status,
                   customer_name, customer_email, customer_phone, customer_address,
                   total, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderHeaderRow::into_record).collect()
    }

    /// Update an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        invoice_no: &InvoiceNumber,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE orders
            SET status = $2, updated_at = now()
            WHERE invoice_no = $1
            ",
        )
        .bind(invoice_no)
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn lines_for(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows: Vec<OrderLineRow> = sqlx::query_as(
            r"
            SELECT product_id, name, quantity, unit_price, image
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }
}

/// Generate a human-legible invoice number, e.g. `INV-20260807-4821`.
///
/// Uniqueness is enforced by the database; [`OrderRepository::create`]
/// retries with a fresh suffix on collision.
fn generate_invoice_number(now: DateTime<Utc>) -> InvoiceNumber {
    let suffix: u32 = rand::rng().random_range(0..10_000);
    InvoiceNumber::new(format!("INV-{}-{suffix:04}", now.format("%Y%m%d")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_invoice_number_shape() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let invoice = generate_invoice_number(now);
        let s = invoice.as_str();

        assert!(s.starts_with("INV-20260807-"), "got {s}");
        assert_eq!(s.len(), "INV-20260807-0000".len());
        assert!(s.rsplit('-').next().unwrap().chars().all(char::is_numeric));
    }

    #[test]
    fn test_order_line_row_clamps_quantity() {
        let row = OrderLineRow {
            product_id: ProductId::new(1),
            name: "Workbook".to_string(),
            quantity: -3,
            unit_price: Decimal::ONE,
            image: None,
        };
        assert_eq!(OrderLine::from(row).quantity, 1);
    }
}
