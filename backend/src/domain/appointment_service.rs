//! Appointment domain services.
//!
//! These services implement the appointment driving ports on top of an
//! [`AppointmentRepository`]. Every write that places an appointment into a
//! slot first reads the slot's active holders; the store's own uniqueness
//! guarantee backs this up when two writers race.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ports::{
    AppointmentCommand, AppointmentPayload, AppointmentQuery, AppointmentRepository,
    AppointmentRepositoryError, AvailableSlotsResponse, BookAppointmentRequest,
    CalendarMonthResponse, ConfirmAppointmentRequest, EditAppointmentRequest, RescheduleRequest,
    UpcomingRequest,
};
use crate::domain::{
    AdminCapability, Appointment, AppointmentAction, AppointmentEdit, AppointmentId,
    AppointmentSelection, AppointmentValidationError, ClinicClock, Error, HistorySearch,
    InvalidTransition, NewAppointment, PatientDetails, PatientLookup, SlotKey, TimeSlot,
    UpcomingWindow, group_by_date, upcoming,
};

/// Longest upcoming window an admin may request.
pub const MAX_UPCOMING_HORIZON_DAYS: u32 = 90;
/// Largest upcoming list an admin may request.
pub const MAX_UPCOMING_LIMIT: usize = 50;

fn map_repository_error(error: AppointmentRepositoryError) -> Error {
    match error {
        AppointmentRepositoryError::Connection { message } => {
            error!(%message, "appointment store unavailable");
            Error::service_unavailable(format!("appointment repository unavailable: {message}"))
        }
        AppointmentRepositoryError::Query { message } => {
            error!(%message, "appointment store query failed");
            Error::internal(format!("appointment repository error: {message}"))
        }
        AppointmentRepositoryError::SlotTaken { date, time } => {
            warn!(%date, %time, "store rejected a write into an occupied slot");
            slot_conflict(SlotKey { date, time })
        }
        AppointmentRepositoryError::Stale { id } => {
            warn!(appointment_id = %id, "store rejected a write from an outdated read");
            Error::conflict(format!("appointment {id} was changed by another request"))
                .with_details(json!({
                    "code": "stale_appointment",
                    "id": id.to_string(),
                }))
        }
    }
}

/// `Conflict` error reported when an active appointment holds `slot`.
pub(crate) fn slot_conflict(slot: SlotKey) -> Error {
    Error::conflict(format!("the {slot} slot is no longer available")).with_details(json!({
        "code": "slot_conflict",
        "preferredDate": slot.date.to_string(),
        "preferredTime": slot.time.label(),
    }))
}

fn map_validation_error(error: AppointmentValidationError) -> Error {
    match error.field() {
        Some(field) => Error::invalid_request(error.to_string()).with_details(json!({
            "field": field,
            "code": "missing_field",
        })),
        None => Error::invalid_request(error.to_string()),
    }
}

fn map_transition_error(error: InvalidTransition) -> Error {
    Error::conflict(error.to_string()).with_details(json!({
        "code": "invalid_transition",
        "status": error.from.as_str(),
        "action": error.action.as_str(),
    }))
}

fn not_found(id: AppointmentId) -> Error {
    Error::not_found(format!("appointment {id} not found"))
}

fn parse_time_slot(raw: &str) -> Result<TimeSlot, Error> {
    raw.parse().map_err(|_| {
        Error::invalid_request(format!("'{raw}' is not a bookable time slot")).with_details(json!({
            "field": "preferredTime",
            "code": "unknown_time_slot",
            "value": raw,
        }))
    })
}

/// Shared read helpers for both services.
#[derive(Clone)]
struct AppointmentStore<R> {
    repo: Arc<R>,
    clock: ClinicClock,
}

impl<R> AppointmentStore<R>
where
    R: AppointmentRepository,
{
    async fn select(&self, selection: &AppointmentSelection) -> Result<Vec<Appointment>, Error> {
        self.repo
            .select(selection)
            .await
            .map_err(map_repository_error)
    }

    async fn load(&self, id: AppointmentId) -> Result<Appointment, Error> {
        self.repo
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(id))
    }

    fn ensure_bookable_date(&self, date: NaiveDate) -> Result<(), Error> {
        let today = self.clock.today();
        if date < today {
            return Err(
                Error::invalid_request(format!("{date} is in the past")).with_details(json!({
                    "field": "preferredDate",
                    "code": "date_in_past",
                    "value": date.to_string(),
                    "today": today.to_string(),
                })),
            );
        }
        Ok(())
    }

    fn parse_reschedule(&self, request: &RescheduleRequest) -> Result<SlotKey, Error> {
        let time = parse_time_slot(request.preferred_time.as_str())?;
        self.ensure_bookable_date(request.preferred_date)?;
        Ok(SlotKey {
            date: request.preferred_date,
            time,
        })
    }

    /// Fail with `SlotConflict` when another active appointment holds `slot`.
    async fn ensure_slot_free(
        &self,
        slot: SlotKey,
        moving: Option<AppointmentId>,
    ) -> Result<(), Error> {
        let mut selection = AppointmentSelection::slot_holders(slot);
        if let Some(id) = moving {
            selection = selection.excluding(id);
        }
        let holders = self.select(&selection).await?;
        if holders.is_empty() {
            Ok(())
        } else {
            info!(%slot, "slot already held");
            Err(slot_conflict(slot))
        }
    }

    /// Write `next` over `previous`, failing if the row moved on meanwhile.
    async fn store(&self, previous: &Appointment, next: &Appointment) -> Result<Appointment, Error> {
        self.repo
            .update(previous, next)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(previous.id()))
    }
}

/// Appointment service implementing the command driving port.
#[derive(Clone)]
pub struct AppointmentCommandService<R> {
    store: AppointmentStore<R>,
}

impl<R> AppointmentCommandService<R> {
    /// Create a new command service.
    ///
    /// # Examples
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use clinic_backend::domain::{AppointmentCommandService, ClinicClock};
    /// # use clinic_backend::domain::ports::FixtureAppointmentRepository;
    /// # use mockable::DefaultClock;
    /// let clock = ClinicClock::with_offset_minutes(Arc::new(DefaultClock), 180)
    ///     .expect("valid offset");
    /// let _service = AppointmentCommandService::new(Arc::new(FixtureAppointmentRepository), clock);
    /// ```
    pub fn new(repo: Arc<R>, clock: ClinicClock) -> Self {
        Self {
            store: AppointmentStore { repo, clock },
        }
    }
}

impl<R> AppointmentCommandService<R>
where
    R: AppointmentRepository,
{
    async fn transition(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
        action: AppointmentAction,
    ) -> Result<AppointmentPayload, Error> {
        let current = self.store.load(id).await?;
        let next = current
            .apply(action, self.store.clock.now())
            .map_err(map_transition_error)?;
        let saved = self.store.store(&current, &next).await?;
        info!(
            admin = capability.username(),
            appointment_id = %id,
            %action,
            status = %saved.status(),
            "appointment status changed"
        );
        Ok(saved.into())
    }

    fn merged_patient(
        current: &PatientDetails,
        request: &EditAppointmentRequest,
    ) -> Result<Option<PatientDetails>, Error> {
        if request.name.is_none()
            && request.phone.is_none()
            && request.email.is_none()
            && request.national_id.is_none()
        {
            return Ok(None);
        }
        let pick = |field: &Option<String>, existing: &str| {
            field.clone().unwrap_or_else(|| existing.to_owned())
        };
        PatientDetails::new(
            pick(&request.name, current.name()),
            pick(&request.phone, current.phone()),
            pick(&request.email, current.email()),
            pick(&request.national_id, current.national_id()),
        )
        .map(Some)
        .map_err(map_validation_error)
    }
}

#[async_trait]
impl<R> AppointmentCommand for AppointmentCommandService<R>
where
    R: AppointmentRepository,
{
    async fn book(&self, request: BookAppointmentRequest) -> Result<AppointmentPayload, Error> {
        let patient = PatientDetails::new(
            request.name,
            request.phone,
            request.email,
            request.national_id,
        )
        .map_err(map_validation_error)?;
        let slot = SlotKey {
            date: request.preferred_date,
            time: parse_time_slot(request.preferred_time.as_str())?,
        };
        self.store.ensure_bookable_date(slot.date)?;
        let booking = NewAppointment::new(
            patient,
            request.service,
            slot,
            request.message,
            self.store.clock.now(),
        )
        .map_err(map_validation_error)?;

        self.store.ensure_slot_free(slot, None).await?;
        let stored = self
            .store
            .repo
            .insert(&booking)
            .await
            .map_err(map_repository_error)?;
        info!(appointment_id = %stored.id(), %slot, "appointment booked");
        Ok(stored.into())
    }

    async fn confirm(
        &self,
        capability: &AdminCapability,
        request: ConfirmAppointmentRequest,
    ) -> Result<AppointmentPayload, Error> {
        let Some(reschedule) = request.reschedule.as_ref() else {
            return self
                .transition(capability, request.id, AppointmentAction::Confirm)
                .await;
        };

        let current = self.store.load(request.id).await?;
        let now = self.store.clock.now();
        let confirmed = current
            .apply(AppointmentAction::Confirm, now)
            .map_err(map_transition_error)?;
        let slot = self.store.parse_reschedule(reschedule)?;
        if slot != current.slot() {
            self.store.ensure_slot_free(slot, Some(current.id())).await?;
        }
        let saved = self
            .store
            .store(&current, &confirmed.rescheduled(slot, now))
            .await?;
        info!(
            admin = capability.username(),
            appointment_id = %saved.id(),
            from = %current.slot(),
            to = %saved.slot(),
            "appointment confirmed with reschedule"
        );
        Ok(saved.into())
    }

    async fn reject(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error> {
        self.transition(capability, id, AppointmentAction::Reject)
            .await
    }

    async fn complete(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error> {
        self.transition(capability, id, AppointmentAction::Complete)
            .await
    }

    async fn soft_delete(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error> {
        self.transition(capability, id, AppointmentAction::Delete)
            .await
    }

    async fn edit(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
        request: EditAppointmentRequest,
    ) -> Result<AppointmentPayload, Error> {
        let current = self.store.load(id).await?;
        if current.status().is_terminal() {
            return Err(Error::conflict(format!(
                "cannot edit an appointment that is {}",
                current.status()
            ))
            .with_details(json!({
                "code": "invalid_transition",
                "status": current.status().as_str(),
                "action": "edit",
            })));
        }

        let slot = match request.reschedule.as_ref() {
            Some(reschedule) => {
                let slot = self.store.parse_reschedule(reschedule)?;
                if slot != current.slot() {
                    self.store.ensure_slot_free(slot, Some(id)).await?;
                }
                Some(slot)
            }
            None => None,
        };
        let edit = AppointmentEdit {
            patient: Self::merged_patient(current.patient(), &request)?,
            service: request.service,
            message: request.message.map(Some),
            slot,
        };
        if edit.is_empty() {
            return Ok(current.into());
        }

        let next = current
            .edited(edit, self.store.clock.now())
            .map_err(map_validation_error)?;
        let saved = self.store.store(&current, &next).await?;
        info!(admin = capability.username(), appointment_id = %id, "appointment edited");
        Ok(saved.into())
    }

    async fn purge(&self, capability: &AdminCapability, id: AppointmentId) -> Result<(), Error> {
        let removed = self
            .store
            .repo
            .delete(&id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(not_found(id));
        }
        info!(admin = capability.username(), appointment_id = %id, "appointment purged");
        Ok(())
    }
}

/// Appointment service implementing the query driving port.
#[derive(Clone)]
pub struct AppointmentQueryService<R> {
    store: AppointmentStore<R>,
}

impl<R> AppointmentQueryService<R> {
    /// Create a new query service.
    pub fn new(repo: Arc<R>, clock: ClinicClock) -> Self {
        Self {
            store: AppointmentStore { repo, clock },
        }
    }
}

fn payloads(rows: Vec<Appointment>) -> Vec<AppointmentPayload> {
    rows.into_iter().map(AppointmentPayload::from).collect()
}

fn upcoming_window(request: UpcomingRequest, clock: &ClinicClock) -> Result<UpcomingWindow, Error> {
    let defaults = UpcomingWindow::new(request.from.unwrap_or_else(|| clock.local_now()));
    let horizon_days = request.horizon_days.unwrap_or(defaults.horizon_days);
    if horizon_days > MAX_UPCOMING_HORIZON_DAYS {
        return Err(
            Error::invalid_request(format!(
                "horizonDays must be at most {MAX_UPCOMING_HORIZON_DAYS}"
            ))
            .with_details(json!({ "field": "horizonDays", "code": "out_of_range" })),
        );
    }
    let limit = request.limit.unwrap_or(defaults.limit);
    if limit == 0 || limit > MAX_UPCOMING_LIMIT {
        return Err(
            Error::invalid_request(format!("limit must be between 1 and {MAX_UPCOMING_LIMIT}"))
                .with_details(json!({ "field": "limit", "code": "out_of_range" })),
        );
    }
    Ok(UpcomingWindow {
        horizon_days,
        limit,
        ..defaults
    })
}

#[async_trait]
impl<R> AppointmentQuery for AppointmentQueryService<R>
where
    R: AppointmentRepository,
{
    async fn available_slots(&self, date: NaiveDate) -> Result<AvailableSlotsResponse, Error> {
        if date < self.store.clock.today() {
            return Ok(AvailableSlotsResponse {
                date,
                slots: Vec::new(),
            });
        }
        let taken: HashSet<TimeSlot> = self
            .store
            .select(&AppointmentSelection::slot_occupancy(date, None))
            .await?
            .iter()
            .map(Appointment::preferred_time)
            .collect();
        let slots = TimeSlot::ALL
            .into_iter()
            .filter(|slot| !taken.contains(slot))
            .collect();
        Ok(AvailableSlotsResponse { date, slots })
    }

    async fn lookup_status(&self, lookup: PatientLookup) -> Result<AppointmentPayload, Error> {
        self.store
            .select(&AppointmentSelection::status_lookup(&lookup))
            .await?
            .into_iter()
            .next()
            .map(AppointmentPayload::from)
            .ok_or_else(|| Error::not_found("no appointment matches the supplied details"))
    }

    async fn pending_queue(
        &self,
        _capability: &AdminCapability,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        self.store
            .select(&AppointmentSelection::pending_queue())
            .await
            .map(payloads)
    }

    async fn calendar_feed(
        &self,
        _capability: &AdminCapability,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        self.store
            .select(&AppointmentSelection::calendar_feed())
            .await
            .map(payloads)
    }

    async fn calendar_month(
        &self,
        _capability: &AdminCapability,
        year: i32,
        month: u32,
    ) -> Result<CalendarMonthResponse, Error> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(
                Error::invalid_request(format!("{year}-{month} is not a calendar month"))
                    .with_details(json!({ "field": "month", "code": "invalid_month" })),
            );
        }
        let feed: Vec<Appointment> = self
            .store
            .select(&AppointmentSelection::calendar_feed())
            .await?
            .into_iter()
            .filter(|row| {
                let date = row.preferred_date();
                date.year() == year && date.month() == month
            })
            .collect();
        let days = group_by_date(&feed)
            .into_iter()
            .map(|(date, rows)| (date, payloads(rows)))
            .collect();
        Ok(CalendarMonthResponse { year, month, days })
    }

    async fn upcoming(
        &self,
        _capability: &AdminCapability,
        request: UpcomingRequest,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        let window = upcoming_window(request, &self.store.clock)?;
        let feed = self
            .store
            .select(&AppointmentSelection::calendar_feed())
            .await?;
        Ok(payloads(upcoming(&feed, &window)))
    }

    async fn history(
        &self,
        _capability: &AdminCapability,
        search: HistorySearch,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        let rows = self.store.select(&AppointmentSelection::history()).await?;
        Ok(rows
            .iter()
            .filter(|row| search.matches(row))
            .map(AppointmentPayload::from)
            .collect())
    }

    async fn get(
        &self,
        _capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error> {
        self.store.load(id).await.map(AppointmentPayload::from)
    }
}

#[cfg(test)]
#[path = "appointment_service_tests.rs"]
mod tests;
