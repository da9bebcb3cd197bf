//! Shared cryptographic helpers for LandSure services.

pub mod jwt;

pub use jwt::{Claims, JwtKeys};
