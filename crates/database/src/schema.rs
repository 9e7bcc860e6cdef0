// Kept in sync by hand with the DDL in `bootstrap.rs`.

diesel::table! {
    alerts (id) {
        id -> Int4,
        disaster_type -> Varchar,
        message -> Varchar,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        created_at -> Timestamptz,
        status -> Varchar,
    }
}

diesel::table! {
    user_tokens (id) {
        id -> Int4,
        token -> Varchar,
        device_info -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    assistance_requests (id) {
        id -> Int4,
        user_token -> Varchar,
        user_name -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
        message -> Varchar,
        device_info -> Varchar,
        created_at -> Timestamptz,
        status -> Varchar,
        priority -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(alerts, user_tokens, assistance_requests,);
