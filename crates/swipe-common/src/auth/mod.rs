//! Authentication utilities
//!
//! Identities are issued elsewhere; this crate only verifies bearer tokens.

mod jwt;

pub use jwt::{Claims, JwtService};
