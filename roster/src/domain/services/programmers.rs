use std::sync::Arc;

use super::{decode_rows, encode_row, ensure_signed_in, log_store_error};
use crate::domain::models::{Npm, ProgrammerForm, ProgrammerProfile};
use crate::domain::ports::outbound::{KeyValueStore, RowKey, SelectQuery, Table, TableStore};
use crate::domain::{specialty_options, RecordError, SessionGate};

const SEARCH_COLUMNS: [&str; 4] = ["nama", "no_hp", "bidang", "region"];

/// The programmer directory with its current search and specialty filter.
pub struct ProgrammerDirectory<S: TableStore, K: KeyValueStore> {
    store: Arc<S>,
    gate: Arc<SessionGate<K>>,
    search: String,
    specialty: Option<String>,
    programmers: Vec<ProgrammerProfile>,
}

impl<S: TableStore, K: KeyValueStore> ProgrammerDirectory<S, K> {
    pub fn new(store: Arc<S>, gate: Arc<SessionGate<K>>) -> Self {
        Self {
            store,
            gate,
            search: String::new(),
            specialty: None,
            programmers: Vec::new(),
        }
    }

    pub fn programmers(&self) -> &[ProgrammerProfile] {
        &self.programmers
    }

    pub fn find(&self, npm: Npm) -> Option<&ProgrammerProfile> {
        self.programmers.iter().find(|p| p.npm == npm)
    }

    pub fn specialties(&self) -> Vec<String> {
        specialty_options(&self.programmers)
    }

    /// Sets the filter and loads. Blank search or specialty means no filter.
    pub async fn reload(
        &mut self,
        search: &str,
        specialty: Option<&str>,
    ) -> Result<(), RecordError> {
        self.search = search.trim().to_string();
        self.specialty = specialty
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.refresh().await
    }

    /// Loads again with the current filter.
    pub async fn refresh(&mut self) -> Result<(), RecordError> {
        let mut query = SelectQuery::all()
            .order_by("nama")
            .search(&self.search, &SEARCH_COLUMNS);
        if let Some(specialty) = &self.specialty {
            query = query.filter("bidang", specialty.as_str());
        }

        let rows = self
            .store
            .select(Table::Programmers, &query)
            .await
            .map_err(log_store_error(Table::Programmers, "select"))?;
        self.programmers = decode_rows(Table::Programmers, rows);
        Ok(())
    }

    pub async fn create(&mut self, form: &ProgrammerForm) -> Result<(), RecordError> {
        ensure_signed_in(&self.gate).await?;
        let row = form.validate()?;

        self.store
            .insert(Table::Programmers, encode_row(&row)?)
            .await
            .map_err(log_store_error(Table::Programmers, "insert"))?;
        self.refresh().await
    }

    /// Matches on the existing npm, so the form may change it.
    pub async fn update(&mut self, npm: Npm, form: &ProgrammerForm) -> Result<(), RecordError> {
        ensure_signed_in(&self.gate).await?;
        let row = form.validate()?;

        self.store
            .update(
                Table::Programmers,
                RowKey::of(Table::Programmers, npm.as_i64()),
                encode_row(&row)?,
            )
            .await
            .map_err(log_store_error(Table::Programmers, "update"))?;
        self.refresh().await
    }

    pub async fn remove(&mut self, npm: Npm) -> Result<(), RecordError> {
        ensure_signed_in(&self.gate).await?;
        self.store
            .delete(Table::Programmers, RowKey::of(Table::Programmers, npm.as_i64()))
            .await
            .map_err(log_store_error(Table::Programmers, "delete"))?;
        self.refresh().await
    }
}
