use thiserror::Error;

/// Errors surfaced by the trip planning core
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Simulation failed at {speed_kmh} km/h: {reason}")]
    Simulation { speed_kmh: f64, reason: String },

    #[error("No candidate speed produced a result")]
    NoResults,

    #[error("Geocoding failed for '{0}'")]
    Geocoding(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl PlannerError {
    pub fn simulation(speed_kmh: f64, reason: impl Into<String>) -> Self {
        PlannerError::Simulation {
            speed_kmh,
            reason: reason.into(),
        }
    }

    /// Whether the error only invalidates a single candidate speed
    pub fn is_candidate_local(&self) -> bool {
        matches!(self, PlannerError::Simulation { .. })
    }
}

impl From<validator::ValidationErrors> for PlannerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PlannerError::InvalidConfig(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PlannerError::simulation(90.0, "non-finite energy");
        assert_eq!(
            error.to_string(),
            "Simulation failed at 90 km/h: non-finite energy"
        );
        assert_eq!(
            PlannerError::NoResults.to_string(),
            "No candidate speed produced a result"
        );
    }

    #[test]
    fn test_candidate_local() {
        assert!(PlannerError::simulation(50.0, "x").is_candidate_local());
        assert!(!PlannerError::NoResults.is_candidate_local());
        assert!(!PlannerError::InvalidConfig("mass".into()).is_candidate_local());
    }
}
