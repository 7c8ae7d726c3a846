use thiserror::Error;

/// Errors raised by the evaluation engine and its collaborators
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FortunaError {
    #[error("Draw data unavailable for {lottery}: {reason}")]
    DataUnavailable { lottery: String, reason: String },

    #[error("Insufficient data: need at least {required} draws, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Model training failed: {reason}")]
    TrainingError { reason: String },

    #[error("Cannot sample {count} unique numbers from [{min}, {max}]")]
    RangeError { min: u32, max: u32, count: usize },

    #[error("Prediction failed: {reason}")]
    PredictionError { reason: String },

    #[error("Invalid draw for {lottery}: {reason}")]
    InvalidDraw { lottery: String, reason: String },

    #[error("Trial count must be greater than zero")]
    InvalidTrials,

    #[error("Window size must be greater than zero")]
    InvalidWindow,

    #[error("Unknown lottery: {0}")]
    UnknownLottery(String),
}

impl FortunaError {
    /// Failures the orchestrator absorbs by falling back to the random baseline.
    pub fn is_recoverable_by_fallback(&self) -> bool {
        matches!(
            self,
            FortunaError::InsufficientData { .. } | FortunaError::TrainingError { .. }
        )
    }
}

pub type FortunaResult<T> = Result<T, FortunaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_formatting() {
        let err = FortunaError::RangeError {
            min: 1,
            max: 5,
            count: 10,
        };

        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("[1, 5]"));
    }

    #[test]
    fn test_insufficient_data_formatting() {
        let err = FortunaError::InsufficientData {
            required: 6,
            available: 3,
        };

        let msg = err.to_string();
        assert!(msg.contains("6"));
        assert!(msg.contains("3"));
    }

    #[test]
    fn test_fallback_classification() {
        assert!(
            FortunaError::TrainingError {
                reason: "empty split".to_string()
            }
            .is_recoverable_by_fallback()
        );
        assert!(
            FortunaError::InsufficientData {
                required: 6,
                available: 2
            }
            .is_recoverable_by_fallback()
        );
        assert!(
            !FortunaError::RangeError {
                min: 1,
                max: 5,
                count: 10
            }
            .is_recoverable_by_fallback()
        );
        assert!(
            !FortunaError::DataUnavailable {
                lottery: "mega7".to_string(),
                reason: "missing".to_string()
            }
            .is_recoverable_by_fallback()
        );
    }
}
