//! User and profile models.

use chrono::{DateTime, Utc};

use kingsway_core::{Email, Phone, UserId};

/// A registered site user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shopper contact details, used to pre-fill the checkout form.
///
/// All fields are optional: a profile row exists as soon as the user saves
/// anything, and checkout falls back to blank fields for the rest.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub full_name: Option<String>,
    pub phone: Option<Phone>,
    pub address: Option<String>,
}
