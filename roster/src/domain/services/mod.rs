mod programmers;
mod standby;
mod tasks;

pub use programmers::*;
pub use standby::*;
pub use tasks::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::ports::outbound::{KeyValueStore, Table};
use super::{RecordError, SessionGate, StoreError};

/// Runs the session guard before a mutation.
async fn ensure_signed_in<K: KeyValueStore>(gate: &SessionGate<K>) -> Result<(), RecordError> {
    if gate.require_auth_or_warn().await {
        Ok(())
    } else {
        Err(RecordError::NotAuthenticated)
    }
}

/// Decodes store rows, dropping the ones that do not fit the record type.
fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(%table, error = %err, "Dropping malformed row");
                None
            }
        })
        .collect();
    tracing::debug!(%table, total, kept = decoded.len(), "Loaded rows");
    decoded
}

fn encode_row(row: &impl Serialize) -> Result<Value, StoreError> {
    serde_json::to_value(row).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn log_store_error(table: Table, action: &'static str) -> impl FnOnce(StoreError) -> StoreError {
    move |err| {
        tracing::error!(%table, action, error = %err, "Store call failed");
        err
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::adapters::outbound::{MemoryKeyValueStore, MemoryTableStore};
    use crate::domain::session::tests::{ayu, RecordingNotifier};
    use crate::domain::SessionGate;

    pub(crate) struct Harness {
        pub store: Arc<MemoryTableStore>,
        pub gate: Arc<SessionGate<MemoryKeyValueStore>>,
        pub notifier: Arc<RecordingNotifier>,
    }

    /// Empty table store plus a gate, signed in when `signed_in` is set.
    pub(crate) async fn harness(signed_in: bool) -> Harness {
        let notifier = Arc::new(RecordingNotifier::default());
        let gate = Arc::new(SessionGate::new(
            Arc::new(MemoryKeyValueStore::new()),
            notifier.clone(),
        ));
        if signed_in {
            gate.store_identity(&ayu()).await.unwrap();
        }
        Harness {
            store: Arc::new(MemoryTableStore::new()),
            gate,
            notifier,
        }
    }
}
