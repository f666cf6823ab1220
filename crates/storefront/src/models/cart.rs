//! The shopper's cart: the single source of truth for what they intend to buy.
//!
//! The cart is a plain value with synchronous, infallible mutation
//! operations. The route layer persists it into one named session slot after
//! every mutation ([`load`]/[`persist`]/[`clear`]); the Postgres-backed
//! session store makes it durable across page reloads. An absent or
//! malformed record is treated as an empty cart, never an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use kingsway_core::ProductId;

use crate::db::catalog::Product;
use crate::models::session_keys;

/// A product snapshot plus quantity.
///
/// Snapshotting name/price at add time keeps the cart stable if the catalog
/// changes while the shopper browses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub image: Option<String>,
    pub category: String,
    /// Always >= 1; an item that would drop to 0 is removed instead.
    pub quantity: u32,
}

impl CartItem {
    /// Extended price for this line (`unit price x quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Ordered collection of cart items with derived totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// The items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `price x quantity` over all items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add one unit of a product.
    ///
    /// If the product is already in the cart its quantity is incremented;
    /// otherwise a new item with quantity 1 is appended.
    pub fn add(&mut self, product: &Product) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            item.quantity = item.quantity.saturating_add(1);
            return;
        }

        self.items.push(CartItem {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity: 1,
        });
    }

    /// Remove a product entirely. No-op when the product is not in the cart.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id != product_id);
    }

    /// Set the quantity of a product.
    ///
    /// Quantities below 1 are ignored: the quantity controls remove the item
    /// instead of setting 0, and the store never holds a quantity <= 0.
    /// No-op when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            item.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

// =============================================================================
// Session Persistence
// =============================================================================

/// Read the cart from its session slot.
///
/// An absent or unreadable record yields an empty cart; corruption is logged
/// but never surfaced to the shopper.
pub async fn load(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(Some(cart)) => cart,
        Ok(None) => Cart::default(),
        Err(e) => {
            tracing::warn!("Failed to read cart from session, starting empty: {e}");
            Cart::default()
        }
    }
}

/// Write the cart back to its session slot.
///
/// Persistence failures are logged; the in-memory cart stays authoritative
/// for the rest of the request.
pub async fn persist(session: &Session, cart: &Cart) {
    if let Err(e) = session.insert(session_keys::CART, cart).await {
        tracing::error!("Failed to persist cart to session: {e}");
    }
}

/// Remove the cart record entirely, so a fresh session starts clean.
pub async fn clear(session: &Session) {
    if let Err(e) = session.remove::<Cart>(session_keys::CART).await {
        tracing::error!("Failed to clear cart from session: {e}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kingsway_core::ProductId;
    use rust_decimal::Decimal;

    fn product(id: i32, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price,
            image: None,
            category: "books".to_string(),
            active: true,
        }
    }

    #[test]
    fn test_add_same_product_increments_quantity() {
        // Adding the same product N times yields one item with quantity N
        let mut cart = Cart::default();
        let p = product(1, Decimal::new(1500, 2));

        for _ in 0..4 {
            cart.add(&p);
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 4);
    }

    #[test]
    fn test_add_distinct_products_appends() {
        let mut cart = Cart::default();
        cart.add(&product(1, Decimal::new(1000, 2)));
        cart.add(&product(2, Decimal::new(2000, 2)));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_totals_recomputed_after_every_mutation() {
        let mut cart = Cart::default();
        let a = product(1, Decimal::new(1050, 2)); // 10.50
        let b = product(2, Decimal::new(300, 2)); // 3.00

        cart.add(&a);
        cart.add(&b);
        cart.add(&b);
        assert_eq!(cart.total(), Decimal::new(1650, 2));
        assert_eq!(cart.item_count(), 3);

        cart.set_quantity(ProductId::new(2), 5);
        assert_eq!(cart.total(), Decimal::new(2550, 2));
        assert_eq!(cart.item_count(), 6);

        cart.remove(ProductId::new(1));
        assert_eq!(cart.total(), Decimal::new(1500, 2));
        assert_eq!(cart.item_count(), 5);

        cart.clear();
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_remove_missing_product_is_noop() {
        let mut cart = Cart::default();
        cart.add(&product(1, Decimal::ONE));
        cart.remove(ProductId::new(99));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_set_quantity_zero_is_ignored() {
        // The store itself never holds a quantity <= 0; removal on zero is
        // the quantity controls' job.
        let mut cart = Cart::default();
        cart.add(&product(1, Decimal::ONE));

        cart.set_quantity(ProductId::new(1), 0);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
        assert!(cart.items().iter().all(|item| item.quantity >= 1));
    }

    #[test]
    fn test_set_quantity_missing_product_is_noop() {
        let mut cart = Cart::default();
        cart.set_quantity(ProductId::new(1), 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut cart = Cart::default();
        cart.add(&product(1, Decimal::new(999, 2)));
        cart.add(&product(2, Decimal::new(2500, 2)));
        cart.set_quantity(ProductId::new(2), 3);

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, cart);
        assert_eq!(restored.total(), cart.total());
        assert_eq!(restored.item_count(), cart.item_count());
    }

    #[test]
    fn test_malformed_record_yields_empty_cart() {
        // Simulates a corrupt session slot: deserialization fails, caller
        // falls back to Cart::default()
        let corrupt: Result<Cart, _> = serde_json::from_str("{\"items\": \"nope\"}");
        assert!(corrupt.is_err());
        assert!(Cart::default().is_empty());
    }

    #[test]
    fn test_line_total() {
        let item = CartItem {
            product_id: ProductId::new(1),
            name: "Workbook".to_string(),
            unit_price: Decimal::new(1250, 2),
            image: None,
            category: "books".to_string(),
            quantity: 3,
        };
        assert_eq!(item.line_total(), Decimal::new(3750, 2));
    }
}
