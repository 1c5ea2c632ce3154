//! Error taxonomy for the scoring engine.

use thiserror::Error;

/// Failures from the shelter/snow enrichment collaborators.
///
/// The engine assumes well-formed `[0, 1]` enrichment values; a failed
/// lookup or an out-of-range value is fatal for the whole scoring pass.
/// No retries happen here, that belongs to the collaborators.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("shelter lookup failed: {0}")]
    Shelter(String),
    #[error("snow lookup failed: {0}")]
    Snow(String),
    #[error("enrichment value {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Failures of one scoring request.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("no route candidates to score")]
    NoCandidates,
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
}

/// Reject enrichment values outside [0, 1] (or non-finite ones).
pub fn validate_unit_interval(value: f64, field: &'static str) -> Result<f64, EnrichmentError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EnrichmentError::OutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_accepts_bounds() {
        assert!(validate_unit_interval(0.0, "x").is_ok());
        assert!(validate_unit_interval(1.0, "x").is_ok());
        assert!(validate_unit_interval(0.37, "x").is_ok());
    }

    #[test]
    fn unit_interval_rejects_bad_values() {
        assert!(validate_unit_interval(-0.01, "x").is_err());
        assert!(validate_unit_interval(1.01, "x").is_err());
        assert!(validate_unit_interval(f64::NAN, "x").is_err());
        assert!(validate_unit_interval(f64::INFINITY, "x").is_err());
    }
}
