use std::sync::Arc;

use anyhow::{Context, Result};
use roster::adapters::outbound::{
    FileKeyValueStore, HttpAuthClient, MemoryAuthClient, MemoryKeyValueStore, MemoryTableStore,
    RestTableStore,
};
use roster::domain::ports::outbound::{AuthClient, KeyValueStore, Notifier, TableStore};
use roster::domain::services::{ProgrammerDirectory, StandbySchedule, TaskBoard};
use roster::domain::{AuthFlow, CalendarLocale, CalendarView, SessionGate};

use crate::config::RosterConfig;

/// Prints user-facing warnings to stderr.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn warn(&self, message: &str) {
        eprintln!("warning: {message}");
    }
}

/// Collaborators shared by every command.
pub struct App<S: TableStore, K: KeyValueStore, A: AuthClient> {
    pub store: Arc<S>,
    pub gate: Arc<SessionGate<K>>,
    pub auth: AuthFlow<A, K>,
    pub locale: CalendarLocale,
}

pub type LiveApp = App<RestTableStore, FileKeyValueStore, HttpAuthClient>;
pub type DevApp = App<MemoryTableStore, MemoryKeyValueStore, MemoryAuthClient>;

impl<S: TableStore, K: KeyValueStore, A: AuthClient> App<S, K, A> {
    fn new(store: S, storage: K, auth: A, locale: CalendarLocale) -> Self {
        let gate = Arc::new(SessionGate::new(Arc::new(storage), Arc::new(StderrNotifier)));
        Self {
            store: Arc::new(store),
            auth: AuthFlow::new(Arc::new(auth), gate.clone()),
            gate,
            locale,
        }
    }

    pub fn task_board(&self) -> TaskBoard<S, K> {
        TaskBoard::new(self.store.clone(), self.gate.clone())
    }

    pub fn schedule(&self, calendar: CalendarView) -> StandbySchedule<S, K> {
        StandbySchedule::new(self.store.clone(), self.gate.clone(), calendar)
    }

    pub fn directory(&self) -> ProgrammerDirectory<S, K> {
        ProgrammerDirectory::new(self.store.clone(), self.gate.clone())
    }
}

impl LiveApp {
    pub fn from_config(config: &RosterConfig) -> Result<Self> {
        let store = RestTableStore::new(&config.store_url, config.store_api_key.clone())
            .context("Failed to set up table store client")?;
        let auth = HttpAuthClient::new(&config.api_url, &config.sign_in_path, &config.register_path)
            .context("Failed to set up auth client")?;
        let storage = FileKeyValueStore::new(RosterConfig::storage_path()?);

        Ok(Self::new(store, storage, auth, config.locale))
    }
}

impl DevApp {
    /// Seeded in-memory collaborators, already signed in as the dev account.
    pub async fn dev(locale: CalendarLocale) -> Result<Self> {
        let app = Self::new(
            MemoryTableStore::seeded(),
            MemoryKeyValueStore::new(),
            MemoryAuthClient::seeded(),
            locale,
        );
        app.auth
            .sign_in("dev", "dev")
            .await
            .context("Failed to sign in the dev account")?;
        Ok(app)
    }
}
