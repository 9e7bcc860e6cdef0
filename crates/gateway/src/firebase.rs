use model::message::AlertNotification;

use crate::{config::Config, error::Error, DeliveryReceipt, NotificationGateway};

/// Broadcasts alerts to a single FCM topic, so every subscribed device
/// receives every alert.
pub struct FcmGateway {
    client: fcm::Client,
    api_key: String,
    recipient: String,
    click_action: Option<String>,
    dry_run: bool,
}

impl FcmGateway {
    pub fn init(config: &Config) -> Result<Self, Error> {
        let api_key = config.api_key()?;
        Ok(FcmGateway {
            client: fcm::Client::new(),
            api_key,
            recipient: format!("/topics/{}", config.topic),
            click_action: config.click_action.clone(),
            dry_run: config.dry_run,
        })
    }

    fn fcm_message<'a>(
        &'a self,
        notification: &'a AlertNotification,
    ) -> Result<fcm::Message<'a>, Error> {
        let fcm_notification = {
            let mut builder = fcm::NotificationBuilder::new();
            builder.title(&notification.title);
            builder.body(&notification.body);
            if let Some(click_action) = &self.click_action {
                builder.click_action(click_action);
            }
            builder.finalize()
        };

        let mut builder = fcm::MessageBuilder::new(&self.api_key, &self.recipient);
        builder.notification(fcm_notification);
        builder.data(&notification.data)?;

        Ok(builder.finalize())
    }
}

#[async_trait]
impl NotificationGateway for FcmGateway {
    async fn send_alert(&self, notification: &AlertNotification) -> Result<DeliveryReceipt, Error> {
        if self.dry_run {
            log::info!(
                "Dry run, not sending alert #{} to {}",
                notification.data.alert_id,
                self.recipient
            );
            return Ok(DeliveryReceipt { message_id: None });
        }

        let fcm_msg = self.fcm_message(notification)?;
        let fcm_response = self.client.send(fcm_msg).await?;
        log::debug!(
            "Alert #{} {:?}",
            notification.data.alert_id,
            fcm_response
        );

        if let Some(reason) = fcm_response.error {
            return Err(Error::FcmRejected(format!("{:?}", reason)));
        }

        Ok(DeliveryReceipt {
            message_id: fcm_response.message_id.map(|id| id.to_string()),
        })
    }
}
