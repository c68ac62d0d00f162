use std::sync::Arc;

use super::{decode_rows, encode_row, ensure_signed_in, log_store_error};
use crate::domain::models::{Status, Task, TaskDraft, TaskId, TaskStatusPatch};
use crate::domain::ports::outbound::{KeyValueStore, RowKey, SelectQuery, Table, TableStore};
use crate::domain::{RecordError, RecordGroup, RecordView, SessionGate, SortOrder, TabFilter};

/// The task board: all work items, ordered by due date.
pub struct TaskBoard<S: TableStore, K: KeyValueStore> {
    store: Arc<S>,
    gate: Arc<SessionGate<K>>,
    tasks: Vec<Task>,
}

impl<S: TableStore, K: KeyValueStore> TaskBoard<S, K> {
    pub fn new(store: Arc<S>, gate: Arc<SessionGate<K>>) -> Self {
        Self {
            store,
            gate,
            tasks: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn groups(&self, tab: TabFilter, sort: SortOrder) -> Vec<RecordGroup<'_, Task>> {
        RecordView::new(tab, sort).apply(&self.tasks)
    }

    pub async fn reload(&mut self) -> Result<(), RecordError> {
        let rows = self
            .store
            .select(Table::Tasks, &SelectQuery::all().order_by("tenggat"))
            .await
            .map_err(log_store_error(Table::Tasks, "select"))?;
        self.tasks = decode_rows(Table::Tasks, rows);
        Ok(())
    }

    /// New tasks always start as `todo`.
    pub async fn create(&mut self, draft: &TaskDraft) -> Result<(), RecordError> {
        ensure_signed_in(&self.gate).await?;
        let row = draft.validate(Status::Todo)?;

        self.store
            .insert(Table::Tasks, encode_row(&row)?)
            .await
            .map_err(log_store_error(Table::Tasks, "insert"))?;
        self.reload().await
    }

    /// Keeps the task's current status unless the draft sets one.
    pub async fn update(&mut self, id: TaskId, draft: &TaskDraft) -> Result<(), RecordError> {
        ensure_signed_in(&self.gate).await?;
        let current = self
            .find(id)
            .map(|t| t.status)
            .ok_or(RecordError::NotFound(id.as_i64()))?;
        let row = draft.validate(draft.status.unwrap_or(current))?;

        self.store
            .update(
                Table::Tasks,
                RowKey::of(Table::Tasks, id.as_i64()),
                encode_row(&row)?,
            )
            .await
            .map_err(log_store_error(Table::Tasks, "update"))?;
        self.reload().await
    }

    /// Flips between done and in progress. Returns the new status.
    pub async fn toggle_done(&mut self, id: TaskId) -> Result<Status, RecordError> {
        ensure_signed_in(&self.gate).await?;
        let next = self
            .find(id)
            .map(|t| t.status.toggled())
            .ok_or(RecordError::NotFound(id.as_i64()))?;

        self.store
            .update(
                Table::Tasks,
                RowKey::of(Table::Tasks, id.as_i64()),
                encode_row(&TaskStatusPatch { status: next })?,
            )
            .await
            .map_err(log_store_error(Table::Tasks, "update"))?;

        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.status = next;
        }
        Ok(next)
    }

    pub async fn remove(&mut self, id: TaskId) -> Result<(), RecordError> {
        ensure_signed_in(&self.gate).await?;
        self.store
            .delete(Table::Tasks, RowKey::of(Table::Tasks, id.as_i64()))
            .await
            .map_err(log_store_error(Table::Tasks, "delete"))?;
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }
}
