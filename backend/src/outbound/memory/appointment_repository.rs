//! In-memory appointment store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{AppointmentRepository, AppointmentRepositoryError};
use crate::domain::{
    Appointment, AppointmentId, AppointmentSelection, NewAppointment, SlotKey,
};

/// Appointment rows held behind a single mutex.
///
/// Every write checks the slot and commits under the same lock, so two
/// racing bookings for one slot cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    rows: Mutex<BTreeMap<AppointmentId, Appointment>>,
}

impl InMemoryAppointmentRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows, replacing any with the same id.
    pub fn with_rows(rows: impl IntoIterator<Item = Appointment>) -> Self {
        let rows = rows.into_iter().map(|row| (row.id(), row)).collect();
        Self {
            rows: Mutex::new(rows),
        }
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<AppointmentId, Appointment>>, AppointmentRepositoryError>
    {
        self.rows
            .lock()
            .map_err(|_| AppointmentRepositoryError::query("appointment store lock poisoned"))
    }
}

fn ensure_slot_free(
    rows: &BTreeMap<AppointmentId, Appointment>,
    slot: SlotKey,
    moving: Option<AppointmentId>,
) -> Result<(), AppointmentRepositoryError> {
    let held = rows.values().any(|row| {
        row.is_active() && row.slot() == slot && Some(row.id()) != moving
    });
    if held {
        Err(AppointmentRepositoryError::slot_taken(slot.date, slot.time))
    } else {
        Ok(())
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn insert(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        let mut rows = self.lock()?;
        ensure_slot_free(&rows, appointment.slot, None)?;
        let stored = appointment.clone().into_appointment(AppointmentId::random());
        rows.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn select(
        &self,
        selection: &AppointmentSelection,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let rows = self.lock()?;
        Ok(selection.apply(rows.values()))
    }

    async fn find_by_id(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn update(
        &self,
        previous: &Appointment,
        next: &Appointment,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut rows = self.lock()?;
        let Some(stored) = rows.get(&previous.id()) else {
            return Ok(None);
        };
        if stored.status() != previous.status() || stored.updated_at() != previous.updated_at() {
            return Err(AppointmentRepositoryError::stale(previous.id()));
        }
        if next.is_active() {
            ensure_slot_free(&rows, next.slot(), Some(next.id()))?;
        }
        rows.insert(next.id(), next.clone());
        Ok(Some(next.clone()))
    }

    async fn delete(&self, id: &AppointmentId) -> Result<bool, AppointmentRepositoryError> {
        Ok(self.lock()?.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::{NaiveDate, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{AppointmentAction, AppointmentStatus, PatientDetails, TimeSlot};

    fn slot(time: TimeSlot) -> SlotKey {
        SlotKey {
            date: NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date"),
            time,
        }
    }

    fn booking(name: &str, time: TimeSlot) -> NewAppointment {
        let patient =
            PatientDetails::new(name, "555 0100", "p@example.com", "12345").expect("patient");
        NewAppointment::new(patient, "Consultation", slot(time), None, Utc::now())
            .expect("booking")
    }

    #[fixture]
    fn repo() -> InMemoryAppointmentRepository {
        InMemoryAppointmentRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn insert_assigns_ids_and_reads_back(repo: InMemoryAppointmentRepository) {
        let stored = repo
            .insert(&booking("Aylin", TimeSlot::T0900))
            .await
            .expect("insert");
        let found = repo.find_by_id(&stored.id()).await.expect("lookup");
        assert_eq!(found, Some(stored));
    }

    #[rstest]
    #[tokio::test]
    async fn second_active_row_in_slot_is_refused(repo: InMemoryAppointmentRepository) {
        repo.insert(&booking("Aylin", TimeSlot::T0900))
            .await
            .expect("first insert");
        let err = repo
            .insert(&booking("Burak", TimeSlot::T0900))
            .await
            .expect_err("slot held");
        assert!(matches!(err, AppointmentRepositoryError::SlotTaken { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_rows_release_the_slot(repo: InMemoryAppointmentRepository) {
        let first = repo
            .insert(&booking("Aylin", TimeSlot::T0900))
            .await
            .expect("first insert");
        let rejected = first
            .apply(AppointmentAction::Reject, Utc::now())
            .expect("pending can be rejected");
        repo.update(&first, &rejected).await.expect("update");

        let second = repo
            .insert(&booking("Burak", TimeSlot::T0900))
            .await
            .expect("slot is free again");
        assert_eq!(second.status(), AppointmentStatus::Pending);
    }

    #[rstest]
    #[tokio::test]
    async fn moving_into_a_held_slot_is_refused(repo: InMemoryAppointmentRepository) {
        repo.insert(&booking("Aylin", TimeSlot::T0900))
            .await
            .expect("first insert");
        let second = repo
            .insert(&booking("Burak", TimeSlot::T0930))
            .await
            .expect("second insert");
        let moved = second.rescheduled(slot(TimeSlot::T0900), Utc::now());

        let err = repo.update(&second, &moved).await.expect_err("slot held");
        assert!(matches!(err, AppointmentRepositoryError::SlotTaken { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn update_from_an_outdated_read_is_refused(repo: InMemoryAppointmentRepository) {
        let pending = repo
            .insert(&booking("Aylin", TimeSlot::T0900))
            .await
            .expect("insert");
        let rejected = pending
            .apply(AppointmentAction::Reject, Utc::now())
            .expect("pending can be rejected");
        repo.update(&pending, &rejected).await.expect("first writer wins");

        let confirmed = pending
            .apply(AppointmentAction::Confirm, Utc::now())
            .expect("pending can be confirmed");
        let err = repo
            .update(&pending, &confirmed)
            .await
            .expect_err("second writer read a pending row");
        assert_eq!(err, AppointmentRepositoryError::stale(pending.id()));

        let stored = repo.find_by_id(&pending.id()).await.expect("lookup");
        assert_eq!(stored.map(|row| row.status()), Some(AppointmentStatus::Rejected));
    }

    #[rstest]
    #[tokio::test]
    async fn update_and_delete_report_missing_rows(repo: InMemoryAppointmentRepository) {
        let ghost = booking("Aylin", TimeSlot::T0900).into_appointment(AppointmentId::random());
        assert_eq!(repo.update(&ghost, &ghost).await.expect("update"), None);
        assert!(!repo.delete(&ghost.id()).await.expect("delete"));
    }

    #[rstest]
    #[tokio::test]
    async fn select_applies_selection(repo: InMemoryAppointmentRepository) {
        let first = repo
            .insert(&booking("Aylin", TimeSlot::T0900))
            .await
            .expect("first insert");
        repo.insert(&booking("Burak", TimeSlot::T0930))
            .await
            .expect("second insert");

        let holders = repo
            .select(&AppointmentSelection::slot_holders(first.slot()))
            .await
            .expect("select");
        assert_eq!(holders, vec![first]);
    }
}
