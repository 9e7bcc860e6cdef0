use diesel::{
    dsl,
    pg::Pg,
    query_builder::{QueryFragment, QueryId},
    ExpressionMethods, QueryDsl,
};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use model::{
    alert::{Alert, AlertStatus, NewAlert},
    location::Location,
    time::DateTimeUtc,
};

use crate::{error::Error, schema::alerts};

pub const DEFAULT_LIST_LIMIT: i64 = 50;

type Columns = (
    alerts::id,
    alerts::disaster_type,
    alerts::message,
    alerts::latitude,
    alerts::longitude,
    alerts::created_at,
    alerts::status,
);

const COLUMNS: Columns = (
    alerts::id,
    alerts::disaster_type,
    alerts::message,
    alerts::latitude,
    alerts::longitude,
    alerts::created_at,
    alerts::status,
);

type Row = (i32, String, String, Option<f64>, Option<f64>, DateTimeUtc, String);

type NewestFirst = (dsl::Desc<alerts::created_at>, dsl::Desc<alerts::id>);

type ListQuery = dsl::Limit<dsl::Order<dsl::Select<alerts::table, Columns>, NewestFirst>>;

fn list_query(limit: i64) -> ListQuery {
    alerts::table
        .select(COLUMNS)
        .order((alerts::created_at.desc(), alerts::id.desc()))
        .limit(limit)
}

fn update_status_query(
    id: i32,
    status: AlertStatus,
) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::update(alerts::table.filter(alerts::id.eq(id))).set(alerts::status.eq(status.as_str()))
}

#[derive(Clone)]
pub struct Repo {}

impl Repo {
    pub async fn insert(
        &self,
        alert: &NewAlert,
        conn: &mut AsyncPgConnection,
    ) -> Result<i32, Error> {
        let values = (
            alerts::disaster_type.eq(&alert.disaster_type),
            alerts::message.eq(&alert.message),
            alerts::latitude.eq(alert.location.map(|l| l.latitude)),
            alerts::longitude.eq(alert.location.map(|l| l.longitude)),
            alerts::status.eq(AlertStatus::Sent.as_str()),
        );

        let id = diesel::insert_into(alerts::table)
            .values(values)
            .returning(alerts::id)
            .get_result::<i32>(conn)
            .await?;

        Ok(id)
    }

    /// Updating a missing alert is not an error, the returned flag tells
    /// whether a row was touched.
    pub async fn update_status(
        &self,
        id: i32,
        status: AlertStatus,
        conn: &mut AsyncPgConnection,
    ) -> Result<bool, Error> {
        let num_rows = update_status_query(id, status).execute(conn).await?;

        Ok(num_rows > 0)
    }

    pub async fn list(&self, limit: i64, conn: &mut AsyncPgConnection) -> Result<Vec<Alert>, Error> {
        let rows = list_query(limit).load::<Row>(conn).await?;

        rows.into_iter()
            .map(
                |(id, disaster_type, message, latitude, longitude, created_at, status)| -> Result<Alert, Error> {
                    Ok(Alert {
                        id,
                        disaster_type,
                        message,
                        location: Location::from_columns(latitude, longitude),
                        created_at,
                        status: status.parse()?,
                    })
                },
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use diesel::{debug_query, pg::Pg};
    use model::alert::AlertStatus;

    use super::{list_query, update_status_query, DEFAULT_LIST_LIMIT};

    #[test]
    fn list_is_newest_first_and_limited() {
        let query = list_query(DEFAULT_LIST_LIMIT);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.starts_with("SELECT \"alerts\".\"id\", "));
        assert!(sql.contains(
            "ORDER BY \"alerts\".\"created_at\" DESC, \"alerts\".\"id\" DESC LIMIT $1"
        ));
        assert!(sql.ends_with("-- binds: [50]"));
    }

    #[test]
    fn status_update_targets_one_alert() {
        let query = update_status_query(7, AlertStatus::SentSuccessfully);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.starts_with("UPDATE \"alerts\" SET \"status\" = $1"));
        assert!(sql.contains("\"alerts\".\"id\" = $2"));
        assert!(sql.ends_with("-- binds: [\"sent_successfully\", 7]"));
    }
}
