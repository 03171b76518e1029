//! PostgreSQL-backed `AppointmentRepository` implementation using Diesel ORM.
//!
//! Selections are translated into boxed Diesel queries. The partial unique
//! index `appointments_active_slot_key` enforces one active row per slot, so
//! a racing writer surfaces as [`AppointmentRepositoryError::SlotTaken`].

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AppointmentRepository, AppointmentRepositoryError};
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentOrder, AppointmentSelection,
    AppointmentStatus, NewAppointment, PatientDetails, SlotKey, TimeSlot,
};

use super::diesel_basic_error_mapping::{
    is_active_slot_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{AppointmentRow, AppointmentUpdate, NewAppointmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::appointments;

/// Diesel-backed implementation of the appointment repository port.
#[derive(Clone)]
pub struct DieselAppointmentRepository {
    pool: DbPool,
}

impl DieselAppointmentRepository {
    /// Create a repository backed by `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AppointmentRepositoryError {
    map_basic_pool_error(error, AppointmentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AppointmentRepositoryError {
    map_basic_diesel_error(
        error,
        AppointmentRepositoryError::query,
        AppointmentRepositoryError::connection,
    )
}

/// Like [`map_diesel_error`], but reports active-slot index violations as
/// `SlotTaken` for `slot`.
fn map_write_error(error: diesel::result::Error, slot: SlotKey) -> AppointmentRepositoryError {
    if is_active_slot_violation(&error) {
        return AppointmentRepositoryError::slot_taken(slot.date, slot.time);
    }
    map_diesel_error(error)
}

/// Convert a database row into a validated domain appointment.
fn row_to_appointment(row: AppointmentRow) -> Result<Appointment, AppointmentRepositoryError> {
    let AppointmentRow {
        id,
        name,
        phone,
        email,
        national_id,
        service,
        preferred_date,
        preferred_time,
        message,
        status,
        created_at,
        updated_at,
    } = row;

    let patient = PatientDetails::new(name, phone, email, national_id)
        .map_err(|err| AppointmentRepositoryError::query(err.to_string()))?;
    let preferred_time = preferred_time
        .parse::<TimeSlot>()
        .map_err(|err| AppointmentRepositoryError::query(err.to_string()))?;
    let status: AppointmentStatus = status.parse().map_err(|_| {
        AppointmentRepositoryError::query(format!("unknown appointment status '{status}'"))
    })?;

    Appointment::new(AppointmentDraft {
        id: AppointmentId::new(id),
        patient,
        service,
        preferred_date,
        preferred_time,
        message,
        status,
        created_at,
        updated_at,
    })
    .map_err(|err| AppointmentRepositoryError::query(err.to_string()))
}

/// Build the SQL equivalent of [`AppointmentSelection::apply`].
fn selection_query(selection: &AppointmentSelection) -> appointments::BoxedQuery<'static, Pg> {
    let filter = &selection.filter;
    let mut query = appointments::table.into_boxed();

    if let Some(date) = filter.preferred_date {
        query = query.filter(appointments::preferred_date.eq(date));
    }
    if let Some(time) = filter.preferred_time {
        query = query.filter(appointments::preferred_time.eq(time.label()));
    }
    if let Some(name) = &filter.name {
        query = query.filter(appointments::name.eq(name.clone()));
    }
    if let Some(phone) = &filter.phone {
        query = query.filter(appointments::phone.eq(phone.clone()));
    }
    if let Some(national_id) = &filter.national_id {
        query = query.filter(appointments::national_id.eq(national_id.clone()));
    }
    if let Some(statuses) = &filter.status_in {
        let labels: Vec<&'static str> = statuses.iter().map(|status| status.as_str()).collect();
        query = query.filter(appointments::status.eq_any(labels));
    }
    if let Some(status) = filter.status_not {
        query = query.filter(appointments::status.ne(status.as_str()));
    }
    if let Some(id) = filter.id_not {
        query = query.filter(appointments::id.ne(*id.as_uuid()));
    }

    // Slot labels are zero-padded `HH:MM`, so text order is time order.
    query = match selection.order {
        Some(AppointmentOrder::CreatedAtDesc) => {
            query.order((appointments::created_at.desc(), appointments::id.asc()))
        }
        Some(AppointmentOrder::UpdatedAtDesc) => {
            query.order((appointments::updated_at.desc(), appointments::id.asc()))
        }
        Some(AppointmentOrder::ScheduleAsc) => query.order((
            appointments::preferred_date.asc(),
            appointments::preferred_time.asc(),
            appointments::id.asc(),
        )),
        None => query.order(appointments::id.asc()),
    };

    if let Some(limit) = selection.limit {
        query = query.limit(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    query
}

/// The row `previous` was read from, provided it has not changed since.
fn guarded_row(
    previous: &Appointment,
) -> diesel::dsl::Filter<
    diesel::dsl::Find<appointments::table, uuid::Uuid>,
    diesel::dsl::And<
        diesel::dsl::Eq<appointments::status, &'static str>,
        diesel::dsl::Eq<appointments::updated_at, chrono::DateTime<chrono::Utc>>,
    >,
> {
    appointments::table.find(*previous.id().as_uuid()).filter(
        appointments::status
            .eq(previous.status().as_str())
            .and(appointments::updated_at.eq(previous.updated_at())),
    )
}

#[async_trait]
impl AppointmentRepository for DieselAppointmentRepository {
    async fn insert(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let patient = &appointment.patient;
        let new_row = NewAppointmentRow {
            name: patient.name(),
            phone: patient.phone(),
            email: patient.email(),
            national_id: patient.national_id(),
            service: &appointment.service,
            preferred_date: appointment.slot.date,
            preferred_time: appointment.slot.time.label(),
            message: appointment.message.as_deref(),
            status: AppointmentStatus::Pending.as_str(),
            created_at: appointment.created_at,
            updated_at: appointment.created_at,
        };

        let row = diesel::insert_into(appointments::table)
            .values(&new_row)
            .returning(AppointmentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_write_error(err, appointment.slot))?;
        row_to_appointment(row)
    }

    async fn select(
        &self,
        selection: &AppointmentSelection,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AppointmentRow> = selection_query(selection)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_appointment).collect()
    }

    async fn find_by_id(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = appointments::table
            .find(*id.as_uuid())
            .select(AppointmentRow::as_select())
            .first::<AppointmentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_appointment).transpose()
    }

    async fn update(
        &self,
        previous: &Appointment,
        next: &Appointment,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let patient = next.patient();
        let changes = AppointmentUpdate {
            name: patient.name(),
            phone: patient.phone(),
            email: patient.email(),
            national_id: patient.national_id(),
            service: next.service(),
            preferred_date: next.preferred_date(),
            preferred_time: next.preferred_time().label(),
            message: next.message(),
            status: next.status().as_str(),
            updated_at: next.updated_at(),
        };

        let row = diesel::update(guarded_row(previous))
            .set(&changes)
            .returning(AppointmentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, next.slot()))?;
        if let Some(row) = row {
            return row_to_appointment(row).map(Some);
        }

        let exists: bool = diesel::select(diesel::dsl::exists(
            appointments::table.find(*previous.id().as_uuid()),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if exists {
            Err(AppointmentRepositoryError::stale(previous.id()))
        } else {
            Ok(None)
        }
    }

    async fn delete(&self, id: &AppointmentId) -> Result<bool, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(appointments::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
