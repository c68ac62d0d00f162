use std::sync::Arc;

use super::{decode_rows, encode_row, ensure_signed_in, log_store_error};
use crate::domain::models::{ProgrammerProfile, StandbyAssignment, StandbyForm, StandbyId};
use crate::domain::ports::outbound::{KeyValueStore, RowKey, SelectQuery, Table, TableStore};
use crate::domain::{
    within_window, CalendarError, CalendarView, CalendarWindow, ProgrammerNames, RecordError,
    SessionGate,
};

/// The on-call schedule, viewed one calendar window at a time.
pub struct StandbySchedule<S: TableStore, K: KeyValueStore> {
    store: Arc<S>,
    gate: Arc<SessionGate<K>>,
    calendar: CalendarView,
    programmers: Vec<ProgrammerProfile>,
    assignments: Vec<StandbyAssignment>,
}

impl<S: TableStore, K: KeyValueStore> StandbySchedule<S, K> {
    pub fn new(store: Arc<S>, gate: Arc<SessionGate<K>>, calendar: CalendarView) -> Self {
        Self {
            store,
            gate,
            calendar,
            programmers: Vec::new(),
            assignments: Vec::new(),
        }
    }

    pub fn calendar(&self) -> &CalendarView {
        &self.calendar
    }

    pub fn calendar_mut(&mut self) -> &mut CalendarView {
        &mut self.calendar
    }

    pub fn window(&self) -> Result<CalendarWindow, CalendarError> {
        self.calendar.window()
    }

    pub fn programmers(&self) -> &[ProgrammerProfile] {
        &self.programmers
    }

    pub fn assignments(&self) -> &[StandbyAssignment] {
        &self.assignments
    }

    pub fn names(&self) -> ProgrammerNames {
        ProgrammerNames::new(&self.programmers)
    }

    /// Assignments dated inside the current window, in date order.
    pub fn visible(&self) -> Result<Vec<&StandbyAssignment>, CalendarError> {
        let window = self.window()?;
        Ok(within_window(&self.assignments, &window))
    }

    pub async fn reload(&mut self) -> Result<(), RecordError> {
        let programmers = self
            .store
            .select(Table::Programmers, &SelectQuery::all().order_by("nama"))
            .await
            .map_err(log_store_error(Table::Programmers, "select"))?;
        let assignments = self
            .store
            .select(Table::Standby, &SelectQuery::all().order_by("tanggal"))
            .await
            .map_err(log_store_error(Table::Standby, "select"))?;

        self.programmers = decode_rows(Table::Programmers, programmers);
        self.assignments = decode_rows(Table::Standby, assignments);
        Ok(())
    }

    pub async fn create(&mut self, form: &StandbyForm) -> Result<(), RecordError> {
        ensure_signed_in(&self.gate).await?;
        let row = form.validate()?;

        self.store
            .insert(Table::Standby, encode_row(&row)?)
            .await
            .map_err(log_store_error(Table::Standby, "insert"))?;
        self.reload().await
    }

    pub async fn update(&mut self, id: StandbyId, form: &StandbyForm) -> Result<(), RecordError> {
        ensure_signed_in(&self.gate).await?;
        let row = form.validate()?;

        self.store
            .update(
                Table::Standby,
                RowKey::of(Table::Standby, id.as_i64()),
                encode_row(&row)?,
            )
            .await
            .map_err(log_store_error(Table::Standby, "update"))?;
        self.reload().await
    }

    pub async fn remove(&mut self, id: StandbyId) -> Result<(), RecordError> {
        ensure_signed_in(&self.gate).await?;
        self.store
            .delete(Table::Standby, RowKey::of(Table::Standby, id.as_i64()))
            .await
            .map_err(log_store_error(Table::Standby, "delete"))?;
        self.assignments.retain(|a| a.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Npm;
    use crate::domain::services::test_support::harness;
    use crate::domain::{CalendarLocale, CalendarMode, ValidationError};
    use serde_json::json;
    use time::macros::date;

    fn calendar() -> CalendarView {
        CalendarView::new(
            date!(2024 - 03 - 06),
            CalendarMode::Week,
            CalendarLocale::English,
        )
    }

    fn seed(store: &crate::adapters::outbound::MemoryTableStore) {
        store.seed(
            Table::Programmers,
            vec![
                json!({"npm": 20, "nama": "Bayu", "bidang": "Mobile"}),
                json!({"npm": 10, "nama": "Ayu", "bidang": "Backend"}),
            ],
        );
        store.seed(
            Table::Standby,
            vec![
                json!({"id": 1, "npm": 10, "tanggal": "2024-03-11",
                       "waktu_mulai": "08:30:00", "waktu_selesai": "15:30:00"}),
                json!({"id": 2, "npm": 20, "tanggal": "2024-03-04",
                       "waktu_mulai": "08:30:00", "waktu_selesai": "15:30:00"}),
                json!({"id": 3, "npm": 10, "tanggal": "2024-03-10",
                       "waktu_mulai": "22:00:00", "waktu_selesai": "06:00:00"}),
                json!({"id": 4, "npm": 99, "tanggal": "2024-03-06",
                       "waktu_mulai": "late", "waktu_selesai": "15:30:00"}),
            ],
        );
    }

    fn form(date: time::Date) -> StandbyForm {
        StandbyForm {
            programmer: Some(Npm::new(10)),
            date: Some(date),
            start: "7.15".to_string(),
            end: "16".to_string(),
        }
    }

    #[tokio::test]
    async fn visible_follows_the_calendar() {
        let h = harness(false).await;
        seed(&h.store);
        let mut schedule = StandbySchedule::new(h.store.clone(), h.gate.clone(), calendar());
        schedule.reload().await.unwrap();

        let visible: Vec<i64> = schedule
            .visible()
            .unwrap()
            .iter()
            .map(|a| a.id.as_i64())
            .collect();
        assert_eq!(visible, vec![2, 3]);

        schedule.calendar_mut().next().unwrap();
        let visible: Vec<i64> = schedule
            .visible()
            .unwrap()
            .iter()
            .map(|a| a.id.as_i64())
            .collect();
        assert_eq!(visible, vec![1]);

        schedule.calendar_mut().set_mode(CalendarMode::Month);
        assert_eq!(schedule.visible().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn names_come_from_loaded_programmers() {
        let h = harness(false).await;
        seed(&h.store);
        let mut schedule = StandbySchedule::new(h.store.clone(), h.gate.clone(), calendar());
        schedule.reload().await.unwrap();

        let names = schedule.names();
        assert_eq!(names.name_of(Npm::new(10)), "Ayu");
        assert_eq!(names.name_of(Npm::new(7)), "#7");
        assert_eq!(schedule.programmers()[0].name, "Ayu");
    }

    #[tokio::test]
    async fn create_normalizes_times() {
        let h = harness(true).await;
        let mut schedule = StandbySchedule::new(h.store.clone(), h.gate.clone(), calendar());

        schedule.create(&form(date!(2024 - 03 - 07))).await.unwrap();

        let stored = h.store.rows(Table::Standby);
        assert_eq!(stored[0]["waktu_mulai"], "07:15:00");
        assert_eq!(stored[0]["waktu_selesai"], "16:00:00");
        assert_eq!(schedule.visible().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bad_time_is_rejected_without_store_call() {
        let h = harness(true).await;
        let mut schedule = StandbySchedule::new(h.store.clone(), h.gate.clone(), calendar());
        let mut bad = form(date!(2024 - 03 - 07));
        bad.start = "7:5".to_string();

        let err = schedule.create(&bad).await.unwrap_err();

        assert!(matches!(
            err,
            RecordError::Validation(ValidationError::InvalidTime(_))
        ));
        assert_eq!(err.to_string(), "Time must be HH:MM, e.g. 08:30");
        assert_eq!(h.store.calls(), 0);
    }

    #[tokio::test]
    async fn update_and_remove() {
        let h = harness(true).await;
        seed(&h.store);
        let mut schedule = StandbySchedule::new(h.store.clone(), h.gate.clone(), calendar());
        schedule.reload().await.unwrap();

        schedule
            .update(StandbyId::new(2), &form(date!(2024 - 03 - 05)))
            .await
            .unwrap();
        let updated = schedule
            .assignments()
            .iter()
            .find(|a| a.id == StandbyId::new(2))
            .unwrap();
        assert_eq!(updated.programmer, Npm::new(10));
        assert_eq!(updated.start_time.as_str(), "07:15:00");

        schedule.remove(StandbyId::new(2)).await.unwrap();
        assert!(schedule.assignments().iter().all(|a| a.id != StandbyId::new(2)));
    }

    #[tokio::test]
    async fn signed_out_remove_is_blocked() {
        let h = harness(false).await;
        seed(&h.store);
        let mut schedule = StandbySchedule::new(h.store.clone(), h.gate.clone(), calendar());
        schedule.reload().await.unwrap();
        let calls = h.store.calls();

        assert!(matches!(
            schedule.remove(StandbyId::new(1)).await,
            Err(RecordError::NotAuthenticated)
        ));
        assert_eq!(h.store.calls(), calls);
        assert_eq!(h.notifier.messages().len(), 1);
    }
}
