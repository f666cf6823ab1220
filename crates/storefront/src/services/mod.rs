//! Business logic services.

pub mod auth;
pub mod checkout;
pub mod gateway;
pub mod invoice;
