use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Every failure the solar services can report to their caller.
#[derive(Debug, Error)]
pub enum SolarError {
    /// Rejected before any expensive work started (empty sweep axis,
    /// non-positive step or sampling frequency, out-of-range angle).
    #[error("{0}")]
    InvalidConfiguration(String),

    /// The sweep ran but no candidate produced a comparable energy total,
    /// e.g. the sun never rose inside the analysed window.
    #[error("No valid orientations evaluated")]
    NoValidOrientation,

    #[error("Invalid timezone identifier: {0}")]
    UnknownTimezone(String),

    #[error("{0}")]
    InvalidDate(String),

    /// Query string that does not deserialize into the endpoint's parameters
    #[error("{0}")]
    InvalidQuery(String),

    /// Failure reported by a solar model collaborator outside the ephemeris crate.
    #[error("Solar computation failed: {0}")]
    Computation(String),

    #[error(transparent)]
    Ephemeris(#[from] solar_positioning::Error),
}

impl SolarError {
    pub fn config(msg: impl Into<String>) -> Self {
        SolarError::InvalidConfiguration(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SolarError::InvalidConfiguration(_)
            | SolarError::UnknownTimezone(_)
            | SolarError::InvalidDate(_)
            | SolarError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            SolarError::NoValidOrientation
            | SolarError::Computation(_)
            | SolarError::Ephemeris(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for SolarError {
    fn from(rejection: QueryRejection) -> Self {
        SolarError::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for SolarError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_client_errors() {
        assert_eq!(SolarError::config("empty").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            SolarError::UnknownTimezone("Mars/Olympus".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_query_rejection_is_client_error() {
        let err = SolarError::InvalidQuery("Failed to deserialize query string: lat: invalid float literal".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("lat"));
    }

    #[test]
    fn test_no_result_is_distinct_from_configuration() {
        let err = SolarError::NoValidOrientation;
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "No valid orientations evaluated");
    }
}
