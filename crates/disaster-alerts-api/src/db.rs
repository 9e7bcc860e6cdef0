use std::time::Duration;

use database::{alert, assistance, bootstrap, config::Config, device};
use diesel_async::{
    pooled_connection::{bb8::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection,
};
use model::{
    alert::{Alert, AlertStatus, NewAlert},
    assistance::{AssistanceRequest, NewAssistanceRequest},
    device::{DeviceToken, TokenRegistration},
    time::DateTimeUtc,
};

use crate::error::Error;

pub type PgAsyncPool = Pool<AsyncPgConnection>;

pub async fn async_pool(config: &Config) -> Result<PgAsyncPool, Error> {
    let db_url = Config::database_url(config);
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);

    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_secs(5))
        .build(manager)
        .await
        .map_err(|e| Error::Generic(e.to_string()))?;

    Ok(pool)
}

/// Everything the request handlers need from persistence.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn ensure_schema(&self) -> Result<(), Error>;

    async fn insert_alert(&self, alert: &NewAlert) -> Result<i32, Error>;

    /// Unknown ids are ignored.
    async fn update_alert_status(&self, id: i32, status: AlertStatus) -> Result<(), Error>;

    async fn list_alerts(&self, limit: i64) -> Result<Vec<Alert>, Error>;

    /// Returns the token row as stored after the upsert.
    async fn upsert_token(&self, registration: &TokenRegistration) -> Result<DeviceToken, Error>;

    async fn insert_assistance_request(
        &self,
        request: &NewAssistanceRequest,
    ) -> Result<(i32, DateTimeUtc), Error>;

    async fn list_assistance_requests(&self, limit: i64) -> Result<Vec<AssistanceRequest>, Error>;
}

pub struct PgStorage {
    pool: PgAsyncPool,
    alerts: alert::Repo,
    devices: device::Repo,
    assistance: assistance::Repo,
}

impl PgStorage {
    pub fn new(pool: PgAsyncPool) -> Self {
        PgStorage {
            pool,
            alerts: alert::Repo {},
            devices: device::Repo {},
            assistance: assistance::Repo {},
        }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn ensure_schema(&self) -> Result<(), Error> {
        let mut conn = self.pool.get().await?;
        bootstrap::ensure_schema(&mut conn).await?;
        Ok(())
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<i32, Error> {
        let mut conn = self.pool.get().await?;
        let id = self.alerts.insert(alert, &mut conn).await?;
        Ok(id)
    }

    async fn update_alert_status(&self, id: i32, status: AlertStatus) -> Result<(), Error> {
        let mut conn = self.pool.get().await?;
        if !self.alerts.update_status(id, status, &mut conn).await? {
            log::debug!("Alert #{} not found, status {} not recorded", id, status);
        }
        Ok(())
    }

    async fn list_alerts(&self, limit: i64) -> Result<Vec<Alert>, Error> {
        let mut conn = self.pool.get().await?;
        let alerts = self.alerts.list(limit, &mut conn).await?;
        Ok(alerts)
    }

    async fn upsert_token(&self, registration: &TokenRegistration) -> Result<DeviceToken, Error> {
        let mut conn = self.pool.get().await?;
        let stored = self.devices.upsert(registration, &mut conn).await?;
        Ok(stored)
    }

    async fn insert_assistance_request(
        &self,
        request: &NewAssistanceRequest,
    ) -> Result<(i32, DateTimeUtc), Error> {
        let mut conn = self.pool.get().await?;
        let inserted = self.assistance.insert(request, &mut conn).await?;
        Ok(inserted)
    }

    async fn list_assistance_requests(&self, limit: i64) -> Result<Vec<AssistanceRequest>, Error> {
        let mut conn = self.pool.get().await?;
        let requests = self.assistance.list(limit, &mut conn).await?;
        Ok(requests)
    }
}

#[cfg(test)]
pub mod memory {
    //! In-process storage with the same ordering and upsert rules as Postgres

    use std::sync::Mutex;

    use chrono::Utc;
    use model::{
        alert::{Alert, AlertStatus, NewAlert},
        assistance::{AssistanceRequest, NewAssistanceRequest, DEFAULT_PRIORITY, DEFAULT_STATUS},
        device::{DeviceToken, TokenRegistration},
        time::DateTimeUtc,
    };

    use super::Storage;
    use crate::error::Error;

    #[derive(Default)]
    struct State {
        alerts: Vec<Alert>,
        tokens: Vec<DeviceToken>,
        requests: Vec<AssistanceRequest>,
    }

    #[derive(Default)]
    pub struct MemoryStorage {
        state: Mutex<State>,
        pub fail_writes: bool,
        /// Only alert status updates fail
        pub fail_updates: bool,
    }

    impl MemoryStorage {
        pub fn failing() -> Self {
            MemoryStorage {
                fail_writes: true,
                ..Default::default()
            }
        }

        pub fn failing_updates() -> Self {
            MemoryStorage {
                fail_updates: true,
                ..Default::default()
            }
        }

        pub fn alerts(&self) -> Vec<Alert> {
            self.state.lock().unwrap().alerts.clone()
        }

        pub fn tokens(&self) -> Vec<DeviceToken> {
            self.state.lock().unwrap().tokens.clone()
        }

        pub fn requests(&self) -> Vec<AssistanceRequest> {
            self.state.lock().unwrap().requests.clone()
        }

        fn check_writable(&self) -> Result<(), Error> {
            if self.fail_writes {
                Err(Error::Generic("storage unavailable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn newest_first<T: Clone>(
        items: &[T],
        key: impl Fn(&T) -> (DateTimeUtc, i32),
        limit: i64,
    ) -> Vec<T> {
        let mut items = items.to_vec();
        items.sort_by_key(|item| std::cmp::Reverse(key(item)));
        items.truncate(limit.max(0) as usize);
        items
    }

    #[async_trait]
    impl Storage for MemoryStorage {
        async fn ensure_schema(&self) -> Result<(), Error> {
            Ok(())
        }

        async fn insert_alert(&self, alert: &NewAlert) -> Result<i32, Error> {
            self.check_writable()?;
            let mut state = self.state.lock().unwrap();
            let id = state.alerts.len() as i32 + 1;
            state.alerts.push(Alert {
                id,
                disaster_type: alert.disaster_type.clone(),
                message: alert.message.clone(),
                location: alert.location,
                created_at: Utc::now(),
                status: AlertStatus::Sent,
            });
            Ok(id)
        }

        async fn update_alert_status(&self, id: i32, status: AlertStatus) -> Result<(), Error> {
            self.check_writable()?;
            if self.fail_updates {
                return Err(Error::Generic("status update failed".to_string()));
            }
            let mut state = self.state.lock().unwrap();
            if let Some(alert) = state.alerts.iter_mut().find(|a| a.id == id) {
                alert.status = status;
            }
            Ok(())
        }

        async fn list_alerts(&self, limit: i64) -> Result<Vec<Alert>, Error> {
            let state = self.state.lock().unwrap();
            Ok(newest_first(&state.alerts, |a| (a.created_at, a.id), limit))
        }

        async fn upsert_token(
            &self,
            registration: &TokenRegistration,
        ) -> Result<DeviceToken, Error> {
            self.check_writable()?;
            let mut state = self.state.lock().unwrap();
            let stored = DeviceToken::registered(registration, Utc::now());
            match state.tokens.iter_mut().find(|t| t.token == registration.token) {
                Some(existing) => *existing = stored.clone(),
                None => state.tokens.push(stored.clone()),
            }
            Ok(stored)
        }

        async fn insert_assistance_request(
            &self,
            request: &NewAssistanceRequest,
        ) -> Result<(i32, DateTimeUtc), Error> {
            self.check_writable()?;
            let mut state = self.state.lock().unwrap();
            let id = state.requests.len() as i32 + 1;
            let created_at = Utc::now();
            state.requests.push(AssistanceRequest {
                id,
                user_token: request.user_token.clone(),
                user_name: request.user_name.clone(),
                location: request.location,
                message: request.message.clone(),
                device_info: request.device_info.clone(),
                created_at,
                status: DEFAULT_STATUS.to_string(),
                priority: DEFAULT_PRIORITY.to_string(),
            });
            Ok((id, created_at))
        }

        async fn list_assistance_requests(
            &self,
            limit: i64,
        ) -> Result<Vec<AssistanceRequest>, Error> {
            let state = self.state.lock().unwrap();
            Ok(newest_first(&state.requests, |r| (r.created_at, r.id), limit))
        }
    }
}
