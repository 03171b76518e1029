//! Driving port for appointment reads.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AdminCapability, AppointmentId, Error, HistorySearch, PatientLookup, TimeSlot,
};

use super::AppointmentPayload;

/// Free slots for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsResponse {
    /// Calendar date.
    pub date: NaiveDate,
    /// Free slots in catalogue order.
    pub slots: Vec<TimeSlot>,
}

/// Appointments for one calendar month grouped by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonthResponse {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1 to 12.
    pub month: u32,
    /// Appointments keyed by date, each day in slot order.
    pub days: BTreeMap<NaiveDate, Vec<AppointmentPayload>>,
}

/// Options for the upcoming sidebar. Absent values use the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingRequest {
    /// Clinic-local instant to look forward from; defaults to now.
    pub from: Option<NaiveDateTime>,
    /// Days after `from` to include; defaults to 7.
    pub horizon_days: Option<u32>,
    /// Maximum rows; defaults to 5.
    pub limit: Option<usize>,
}

/// Driving port for appointment read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentQuery: Send + Sync {
    /// Catalogue slots not held by an active appointment on `date`.
    ///
    /// Dates before the clinic's current local date have no free slots.
    async fn available_slots(&self, date: NaiveDate) -> Result<AvailableSlotsResponse, Error>;

    /// Most recent booking matching the patient's identity fields.
    async fn lookup_status(&self, lookup: PatientLookup) -> Result<AppointmentPayload, Error>;

    /// Pending appointments, newest first.
    async fn pending_queue(
        &self,
        capability: &AdminCapability,
    ) -> Result<Vec<AppointmentPayload>, Error>;

    /// Confirmed and completed appointments in schedule order.
    async fn calendar_feed(
        &self,
        capability: &AdminCapability,
    ) -> Result<Vec<AppointmentPayload>, Error>;

    /// The calendar feed restricted to one month and grouped by date.
    async fn calendar_month(
        &self,
        capability: &AdminCapability,
        year: i32,
        month: u32,
    ) -> Result<CalendarMonthResponse, Error>;

    /// Confirmed or completed appointments starting soon.
    async fn upcoming(
        &self,
        capability: &AdminCapability,
        request: UpcomingRequest,
    ) -> Result<Vec<AppointmentPayload>, Error>;

    /// Non-pending appointments, most recently changed first.
    async fn history(
        &self,
        capability: &AdminCapability,
        search: HistorySearch,
    ) -> Result<Vec<AppointmentPayload>, Error>;

    async fn get(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error>;
}

/// Fixture query backed by an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentQuery;

#[async_trait]
impl AppointmentQuery for FixtureAppointmentQuery {
    async fn available_slots(&self, date: NaiveDate) -> Result<AvailableSlotsResponse, Error> {
        Ok(AvailableSlotsResponse {
            date,
            slots: TimeSlot::ALL.to_vec(),
        })
    }

    async fn lookup_status(&self, _lookup: PatientLookup) -> Result<AppointmentPayload, Error> {
        Err(Error::not_found("no matching appointment"))
    }

    async fn pending_queue(
        &self,
        _capability: &AdminCapability,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        Ok(Vec::new())
    }

    async fn calendar_feed(
        &self,
        _capability: &AdminCapability,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        Ok(Vec::new())
    }

    async fn calendar_month(
        &self,
        _capability: &AdminCapability,
        year: i32,
        month: u32,
    ) -> Result<CalendarMonthResponse, Error> {
        Ok(CalendarMonthResponse {
            year,
            month,
            days: BTreeMap::new(),
        })
    }

    async fn upcoming(
        &self,
        _capability: &AdminCapability,
        _request: UpcomingRequest,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        Ok(Vec::new())
    }

    async fn history(
        &self,
        _capability: &AdminCapability,
        _search: HistorySearch,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        Ok(Vec::new())
    }

    async fn get(
        &self,
        _capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error> {
        Err(Error::not_found(format!("appointment {id} not found")))
    }
}
