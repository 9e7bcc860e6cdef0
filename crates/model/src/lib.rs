//! Model files for the disaster alerts service

pub mod alert;
pub mod assistance;
pub mod device;
pub mod error;
pub mod location;
pub mod message;
pub mod time;

pub use error::ValidationError;
