use thiserror::Error;

/// Rejection of a request before anything is persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Disaster type and message are required")]
    MissingAlertFields,

    #[error("Invalid coordinates format")]
    InvalidCoordinates,

    #[error("Latitude and longitude must be provided together")]
    IncompleteCoordinates,

    #[error("Location coordinates are required")]
    MissingCoordinates,

    #[error("Token is required")]
    MissingToken,
}
