//! Custom validation functions for configuration.
//!
//! Simulated durations are plain `f64`s; these reject the values the
//! scheduler cannot represent.

use validator::ValidationError;

/// A span or horizon: finite and not negative.
pub fn validate_duration(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_finite_non_negative"))
    }
}

/// A distribution mean: finite and strictly positive.
pub fn validate_positive(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_finite_positive"))
    }
}

/// Accepts the level names `tracing` understands, or a full filter directive.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let known = ["trace", "debug", "info", "warn", "error", "off"];
    if known.contains(&level.to_lowercase().as_str()) || level.contains('=') {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert!(validate_duration(0.0).is_ok());
        assert!(validate_duration(3.5).is_ok());
        assert!(validate_duration(-1.0).is_err());
        assert!(validate_duration(f64::NAN).is_err());
        assert!(validate_duration(f64::INFINITY).is_err());
    }

    #[test]
    fn positive_means() {
        assert!(validate_positive(300.0).is_ok());
        assert!(validate_positive(0.0).is_err());
    }

    #[test]
    fn log_levels() {
        assert!(validate_log_level("INFO").is_ok());
        assert!(validate_log_level("quayside_core=trace").is_ok());
        assert!(validate_log_level("loud").is_err());
    }
}
