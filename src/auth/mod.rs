//! Session tokens and credential hashing.

/// Argon2 password hashing
pub mod password;
/// HS256 session tokens
pub mod token;

pub use token::Claims;
