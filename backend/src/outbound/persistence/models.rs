//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{admin_sessions, appointments};

/// Row struct for reading from the appointments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AppointmentRow {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub national_id: String,
    pub service: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new bookings. The database assigns `id`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub(crate) struct NewAppointmentRow<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub national_id: &'a str,
    pub service: &'a str,
    pub preferred_date: NaiveDate,
    pub preferred_time: &'a str,
    pub message: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for the mutable appointment columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = appointments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AppointmentUpdate<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub national_id: &'a str,
    pub service: &'a str,
    pub preferred_date: NaiveDate,
    pub preferred_time: &'a str,
    pub message: Option<&'a str>,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the admin_sessions table, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = admin_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminSessionRow {
    pub token_digest: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
