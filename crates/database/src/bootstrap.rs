//! Schema bootstrap, run once at service start

use diesel_async::{AsyncPgConnection, SimpleAsyncConnection};

use crate::error::Error;

const SCHEMA_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS alerts (
    id            SERIAL PRIMARY KEY,
    disaster_type VARCHAR NOT NULL,
    message       VARCHAR NOT NULL,
    latitude      DOUBLE PRECISION,
    longitude     DOUBLE PRECISION,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    status        VARCHAR NOT NULL DEFAULT 'sent'
);
CREATE INDEX IF NOT EXISTS alerts_created_at_idx ON alerts (created_at DESC);

CREATE TABLE IF NOT EXISTS user_tokens (
    id          SERIAL PRIMARY KEY,
    token       VARCHAR NOT NULL UNIQUE,
    device_info VARCHAR NOT NULL DEFAULT '',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS assistance_requests (
    id          SERIAL PRIMARY KEY,
    user_token  VARCHAR NOT NULL,
    user_name   VARCHAR NOT NULL,
    latitude    DOUBLE PRECISION NOT NULL,
    longitude   DOUBLE PRECISION NOT NULL,
    message     VARCHAR NOT NULL,
    device_info VARCHAR NOT NULL DEFAULT '',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    status      VARCHAR NOT NULL DEFAULT 'pending',
    priority    VARCHAR NOT NULL DEFAULT 'high'
);
CREATE INDEX IF NOT EXISTS assistance_requests_created_at_idx ON assistance_requests (created_at DESC);
"#;

/// Creates the service tables if they are missing. Safe to run repeatedly.
pub async fn ensure_schema(conn: &mut AsyncPgConnection) -> Result<(), Error> {
    conn.batch_execute(SCHEMA_DDL).await?;
    Ok(())
}
