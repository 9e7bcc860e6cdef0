//! Postgres database for the disaster alerts service

pub mod alert;
pub mod assistance;
pub mod bootstrap;
pub mod config;
pub mod device;
pub mod error;
pub mod schema;
