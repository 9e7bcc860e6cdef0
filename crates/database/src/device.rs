use chrono::Utc;
use diesel::{
    pg::Pg,
    query_builder::{QueryFragment, QueryId},
    ExpressionMethods,
};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use model::{
    device::{DeviceToken, TokenRegistration},
    time::DateTimeUtc,
};

use crate::{error::Error, schema::user_tokens};

fn upsert_query(
    registration: &TokenRegistration,
    now: DateTimeUtc,
) -> impl QueryFragment<Pg> + QueryId + Send + '_ {
    diesel::insert_into(user_tokens::table)
        .values((
            user_tokens::token.eq(&registration.token),
            user_tokens::device_info.eq(&registration.device_info),
            user_tokens::created_at.eq(now),
        ))
        .on_conflict(user_tokens::token)
        .do_update()
        .set((
            user_tokens::device_info.eq(&registration.device_info),
            user_tokens::created_at.eq(now),
        ))
}

#[derive(Clone)]
pub struct Repo {}

impl Repo {
    /// Inserts the token or, if it is already known, replaces its device
    /// info and registration time. Both paths write the same values, which
    /// are returned as the stored row.
    pub async fn upsert(
        &self,
        registration: &TokenRegistration,
        conn: &mut AsyncPgConnection,
    ) -> Result<DeviceToken, Error> {
        let now = Utc::now();
        upsert_query(registration, now).execute(conn).await?;

        Ok(DeviceToken::registered(registration, now))
    }
}
