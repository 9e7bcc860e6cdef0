use model::alert::UnknownStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database query error: {0}")]
    QueryError(#[from] diesel::result::Error),

    #[error("Database query returned a bad alert status: {0}")]
    BadStatus(#[from] UnknownStatus),
}
