//! Notification gateway: delivery of alerts to the push provider

#[macro_use]
extern crate async_trait;

extern crate wavesexchange_log as log;

pub mod config;
pub mod error;
pub mod firebase;

use model::message::AlertNotification;

pub use crate::{error::Error, firebase::FcmGateway};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id, absent in dry-run mode
    pub message_id: Option<String>,
}

/// Outbound push delivery. Implementations make exactly one attempt per call.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send_alert(&self, notification: &AlertNotification) -> Result<DeliveryReceipt, Error>;
}
