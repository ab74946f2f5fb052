//! # mb-api Handlers
//!
//! Each handler validates the request shape, calls one core service and
//! serializes the result.

pub mod auth;
pub mod forums;
pub mod lenient;
pub mod media;
pub mod media_lists;
pub mod posts;
pub mod topics;
pub mod users;

use mb_core::AppError;

/// Parses a path id that must be a positive integer.
pub(crate) fn parse_id(raw: &str, message: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_ids_must_be_positive_integers() {
        assert_eq!(parse_id("12", "bad").unwrap(), 12);
        for raw in ["0", "-1", "abc", "", "1.5"] {
            assert!(parse_id(raw, "bad").is_err(), "{raw} should be rejected");
        }
    }
}
