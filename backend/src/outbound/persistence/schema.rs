//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Patient bookings.
    ///
    /// A partial unique index on `(preferred_date, preferred_time)` covers
    /// rows whose status is `pending` or `confirmed`.
    appointments (id) {
        id -> Uuid,
        name -> Varchar,
        phone -> Varchar,
        email -> Varchar,
        national_id -> Varchar,
        service -> Varchar,
        preferred_date -> Date,
        /// Slot label such as `10:00`.
        preferred_time -> Varchar,
        message -> Nullable<Text>,
        /// Lowercase status label.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Live admin sessions keyed by the SHA-256 digest of the cookie token.
    admin_sessions (token_digest) {
        token_digest -> Varchar,
        username -> Varchar,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(appointments, admin_sessions);
