//! Alert submission workflow: persist, broadcast, record the outcome

use chrono::Utc;
use gateway::{DeliveryReceipt, NotificationGateway};
use model::{
    alert::{AlertStatus, NewAlert},
    message::AlertNotification,
};

use crate::{db::Storage, error::Error};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Delivery {
    Delivered(DeliveryReceipt),
    Failed(String),
    /// No gateway was initialized at startup
    Skipped,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Dispatched {
    pub alert_id: i32,
    pub delivery: Delivery,
}

/// Stores the alert and broadcasts it if a gateway is available.
///
/// Only a failure to store the alert is an error. Delivery problems end up in
/// the alert's status and the log, since the alert itself already exists.
/// There is no transaction around the three steps, so a crash after the
/// insert leaves the alert in the `sent` status.
pub async fn submit_alert(
    storage: &dyn Storage,
    gateway: Option<&dyn NotificationGateway>,
    alert: NewAlert,
) -> Result<Dispatched, Error> {
    let alert_id = storage.insert_alert(&alert).await?;
    log::info!("Alert #{} ({}) stored", alert_id, alert.disaster_type);

    let gateway = match gateway {
        Some(gateway) => gateway,
        None => {
            log::warn!(
                "Notification gateway is not initialized, alert #{} is not broadcast",
                alert_id
            );
            return Ok(Dispatched {
                alert_id,
                delivery: Delivery::Skipped,
            });
        }
    };

    let notification = AlertNotification::compose(
        &alert.disaster_type,
        &alert.message,
        alert.location,
        alert_id,
        Utc::now(),
    );

    let (delivery, status) = match gateway.send_alert(&notification).await {
        Ok(receipt) => {
            log::info!("SENT alert #{} {:?}", alert_id, receipt.message_id);
            (Delivery::Delivered(receipt), AlertStatus::SentSuccessfully)
        }
        Err(err) => {
            log::error!("Failed to send alert #{} | {}", alert_id, err);
            (Delivery::Failed(err.to_string()), AlertStatus::FirebaseError)
        }
    };

    if let Err(err) = storage.update_alert_status(alert_id, status).await {
        log::error!(
            "Failed to record status {} of alert #{} | {}",
            status,
            alert_id,
            err
        );
    }

    Ok(Dispatched { alert_id, delivery })
}

#[cfg(test)]
pub mod tests {
    use std::sync::Mutex;

    use gateway::{DeliveryReceipt, Error as GatewayError, NotificationGateway};
    use model::{
        alert::{AlertStatus, NewAlert},
        location::Location,
        message::AlertNotification,
    };

    use super::{submit_alert, Delivery};
    use crate::{db::memory::MemoryStorage, error::Error};

    /// Gateway answering every send with the same outcome.
    pub struct ScriptedGateway {
        pub fail_with: Option<String>,
        pub sent: Mutex<Vec<AlertNotification>>,
    }

    impl ScriptedGateway {
        pub fn succeeding() -> Self {
            ScriptedGateway {
                fail_with: None,
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(reason: &str) -> Self {
            ScriptedGateway {
                fail_with: Some(reason.to_string()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NotificationGateway for ScriptedGateway {
        async fn send_alert(
            &self,
            notification: &AlertNotification,
        ) -> Result<DeliveryReceipt, GatewayError> {
            self.sent.lock().unwrap().push(notification.clone());
            match &self.fail_with {
                Some(reason) => Err(GatewayError::FcmRejected(reason.clone())),
                None => Ok(DeliveryReceipt {
                    message_id: Some("msg-1".to_string()),
                }),
            }
        }
    }

    fn flood() -> NewAlert {
        NewAlert {
            disaster_type: "flood".to_string(),
            message: "evacuate now".to_string(),
            location: Some(Location::new(40.71, -74.0)),
        }
    }

    #[tokio::test]
    async fn delivered_alert_is_marked_successful() {
        let storage = MemoryStorage::default();
        let gateway = ScriptedGateway::succeeding();

        let dispatched = submit_alert(&storage, Some(&gateway as &dyn NotificationGateway), flood())
            .await
            .unwrap();

        assert_eq!(dispatched.alert_id, 1);
        assert!(matches!(dispatched.delivery, Delivery::Delivered(_)));
        assert_eq!(storage.alerts()[0].status, AlertStatus::SentSuccessfully);

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "FLOOD ALERT");
        assert_eq!(sent[0].data.alert_id, "1");
    }

    #[tokio::test]
    async fn failed_delivery_is_recorded_not_raised() {
        let storage = MemoryStorage::default();
        let gateway = ScriptedGateway::failing("Unavailable");

        let dispatched = submit_alert(&storage, Some(&gateway as &dyn NotificationGateway), flood())
            .await
            .unwrap();

        assert_eq!(
            dispatched.delivery,
            Delivery::Failed("FcmRejected: Unavailable".to_string())
        );
        assert_eq!(storage.alerts()[0].status, AlertStatus::FirebaseError);
    }

    #[tokio::test]
    async fn missing_gateway_leaves_default_status() {
        let storage = MemoryStorage::default();

        let dispatched = submit_alert(&storage, None, flood()).await.unwrap();

        assert_eq!(dispatched.delivery, Delivery::Skipped);
        assert_eq!(storage.alerts()[0].status, AlertStatus::Sent);
    }

    #[tokio::test]
    async fn storage_failure_stops_before_delivery() {
        let storage = MemoryStorage::failing();
        let gateway = ScriptedGateway::succeeding();

        let res =
            submit_alert(&storage, Some(&gateway as &dyn NotificationGateway), flood()).await;

        assert!(matches!(res, Err(Error::Generic(_))));
        assert!(gateway.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_update_failure_does_not_fail_submission() {
        let storage = MemoryStorage::failing_updates();
        let gateway = ScriptedGateway::succeeding();

        let dispatched = submit_alert(&storage, Some(&gateway as &dyn NotificationGateway), flood())
            .await
            .unwrap();

        assert_eq!(dispatched.alert_id, 1);
        assert!(matches!(dispatched.delivery, Delivery::Delivered(_)));
        assert_eq!(gateway.sent.lock().unwrap().len(), 1);
        assert_eq!(storage.alerts()[0].status, AlertStatus::Sent);
    }

    #[tokio::test]
    async fn ids_increase_across_submissions() {
        let storage = MemoryStorage::default();
        let mut previous = 0;
        for _ in 0..5 {
            let dispatched = submit_alert(&storage, None, flood()).await.unwrap();
            assert!(dispatched.alert_id > previous);
            previous = dispatched.alert_id;
        }
    }
}
