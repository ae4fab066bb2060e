//! Delete-password checks.
//!
//! Passwords are stored and compared as plain strings. Every caller goes
//! through `passwords_match`, so a hashed scheme only has to change this file.

/// Exact, case-sensitive comparison of a stored password with a supplied one.
pub fn passwords_match(stored: &str, supplied: &str) -> bool {
    stored == supplied
}
