//! Session-related types.
//!
//! Types stored in the session: login state, the durable cart record, and
//! the in-flight checkout.

use serde::{Deserialize, Serialize};

use kingsway_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the durable cart record. Removed entirely on cart clear so a
    /// fresh session starts clean.
    pub const CART: &str = "cart";

    /// Key for the in-flight checkout (pending order + payment stage).
    pub const CHECKOUT: &str = "checkout";

    /// Key for the shopper's theme preference (light/dark).
    pub const THEME: &str = "theme";
}
