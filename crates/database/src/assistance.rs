use diesel::{dsl, ExpressionMethods, QueryDsl};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use model::{
    assistance::{AssistanceRequest, NewAssistanceRequest, DEFAULT_PRIORITY, DEFAULT_STATUS},
    location::Location,
    time::DateTimeUtc,
};

use crate::{error::Error, schema::assistance_requests};

pub const DEFAULT_LIST_LIMIT: i64 = 100;

type Columns = (
    assistance_requests::id,
    assistance_requests::user_token,
    assistance_requests::user_name,
    assistance_requests::latitude,
    assistance_requests::longitude,
    assistance_requests::message,
    assistance_requests::device_info,
    assistance_requests::created_at,
    assistance_requests::status,
    assistance_requests::priority,
);

const COLUMNS: Columns = (
    assistance_requests::id,
    assistance_requests::user_token,
    assistance_requests::user_name,
    assistance_requests::latitude,
    assistance_requests::longitude,
    assistance_requests::message,
    assistance_requests::device_info,
    assistance_requests::created_at,
    assistance_requests::status,
    assistance_requests::priority,
);

type Row = (
    i32,
    String,
    String,
    f64,
    f64,
    String,
    String,
    DateTimeUtc,
    String,
    String,
);

type NewestFirst = (
    dsl::Desc<assistance_requests::created_at>,
    dsl::Desc<assistance_requests::id>,
);

type ListQuery =
    dsl::Limit<dsl::Order<dsl::Select<assistance_requests::table, Columns>, NewestFirst>>;

fn list_query(limit: i64) -> ListQuery {
    assistance_requests::table
        .select(COLUMNS)
        .order((
            assistance_requests::created_at.desc(),
            assistance_requests::id.desc(),
        ))
        .limit(limit)
}

#[derive(Clone)]
pub struct Repo {}

impl Repo {
    pub async fn insert(
        &self,
        request: &NewAssistanceRequest,
        conn: &mut AsyncPgConnection,
    ) -> Result<(i32, DateTimeUtc), Error> {
        let values = (
            assistance_requests::user_token.eq(&request.user_token),
            assistance_requests::user_name.eq(&request.user_name),
            assistance_requests::latitude.eq(request.location.latitude),
            assistance_requests::longitude.eq(request.location.longitude),
            assistance_requests::message.eq(&request.message),
            assistance_requests::device_info.eq(&request.device_info),
            assistance_requests::status.eq(DEFAULT_STATUS),
            assistance_requests::priority.eq(DEFAULT_PRIORITY),
        );

        let inserted = diesel::insert_into(assistance_requests::table)
            .values(values)
            .returning((assistance_requests::id, assistance_requests::created_at))
            .get_result::<(i32, DateTimeUtc)>(conn)
            .await?;

        Ok(inserted)
    }

    pub async fn list(
        &self,
        limit: i64,
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<AssistanceRequest>, Error> {
        let rows = list_query(limit).load::<Row>(conn).await?;

        let requests = rows
            .into_iter()
            .map(
                |(
                    id,
                    user_token,
                    user_name,
                    latitude,
                    longitude,
                    message,
                    device_info,
                    created_at,
                    status,
                    priority,
                )| AssistanceRequest {
                    id,
                    user_token,
                    user_name,
                    location: Location::new(latitude, longitude),
                    message,
                    device_info,
                    created_at,
                    status,
                    priority,
                },
            )
            .collect();

        Ok(requests)
    }
}
