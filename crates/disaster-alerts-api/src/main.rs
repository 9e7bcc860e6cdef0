//! Disaster alerts API service executable

extern crate wavesexchange_log as log;

#[macro_use]
extern crate async_trait;

mod api;
mod config;
mod db;
mod dispatch;
mod error;
mod flash;
mod views;

use std::sync::Arc;

use gateway::{FcmGateway, NotificationGateway};

use crate::{
    api::Services,
    db::{PgStorage, Storage},
    flash::FlashKey,
    views::Views,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let pg_config = database::config::Config::load()?;
    let config = config::Config::load()?;
    log::info!("Starting disaster alerts api service with {:?}", config);

    if config.secret_key_is_default {
        log::warn!("SECRET_KEY is not set, flash cookies are signed with a development key");
    }

    log::info!("Connecting to postgres database: {:?}", pg_config);
    let pool = db::async_pool(&pg_config).await?;
    let storage = PgStorage::new(pool);
    storage.ensure_schema().await?;

    let gateway = match gateway::config::Config::load().and_then(|c| {
        log::info!("Initializing notification gateway with {:?}", c);
        FcmGateway::init(&c)
    }) {
        Ok(gateway) => {
            log::info!("Notification gateway initialized");
            Some(Arc::new(gateway) as Arc<dyn NotificationGateway>)
        }
        Err(err) => {
            log::warn!(
                "Notification gateway is not available, alerts will only be stored: {}",
                err
            );
            None
        }
    };

    let services = Services {
        storage: Arc::new(storage),
        gateway,
        flash_key: FlashKey::new(&config.secret_key),
        views: Arc::new(Views::new()?),
    };

    api::start(config.port, config.metrics_port, services).await;

    Ok(())
}
