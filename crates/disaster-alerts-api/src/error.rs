use diesel_async::pooled_connection::PoolError;
use model::ValidationError;
use warp::{http::StatusCode, reject::Reject};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error: {0}")]
    Generic(String),

    #[error("{0}")]
    ValidationError(#[from] ValidationError),

    #[error("Database pool error: {0}")]
    PoolError(#[from] bb8::RunError<PoolError>),

    #[error("Template render error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] database::error::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::ValidationError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Reject for Error {}
