//! Resolution of the engine's tunables from the key/value override store.
//!
//! Only two keys mean anything to the generator. Overrides are plain string
//! rows; a missing key or a value that does not parse as an integer falls
//! back to the built-in default and is never an error.

/// Override key for the count cap: new instances created per generation call.
pub const MAX_INSTANCES_KEY: &str = "MAX_INSTANCES_TO_GENERATE";

/// Override key for the horizon cap: months of lookahead per generation call.
pub const MAX_ADVANCE_MONTHS_KEY: &str = "MAX_ADVANCE_GENERATION_MONTHS";

pub const DEFAULT_MAX_INSTANCES: i64 = 4;
pub const DEFAULT_MAX_ADVANCE_MONTHS: i64 = 13;

/// Resolves a stored override against its built-in default.
pub fn resolve(stored: Option<&str>, default: i64) -> i64 {
    match stored {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::debug!(value = raw, default, "stored setting is not an integer, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_value_uses_default() {
        assert_eq!(resolve(None, DEFAULT_MAX_INSTANCES), 4);
        assert_eq!(resolve(None, DEFAULT_MAX_ADVANCE_MONTHS), 13);
    }

    #[test]
    fn test_present_integer_wins() {
        assert_eq!(resolve(Some("7"), 4), 7);
        assert_eq!(resolve(Some("  12  "), 13), 12);
        assert_eq!(resolve(Some("-3"), 4), -3);
    }

    #[test]
    fn test_malformed_value_uses_default() {
        assert_eq!(resolve(Some("banana"), 4), 4);
        assert_eq!(resolve(Some("4.5"), 4), 4);
        assert_eq!(resolve(Some(""), 13), 13);
    }
}
