use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use super::models::SessionIdentity;
use super::ports::outbound::{KeyValueStore, Notifier, StorageError, StorageEvent};

/// Storage slot holding the signed-in identity as JSON.
pub const SESSION_SLOT: &str = "auth_user";

pub const SIGN_IN_REQUIRED: &str = "Please sign in first.";

/// Answers "is someone signed in?" and blocks mutations when nobody is.
///
/// The stored slot is the source of truth and is re-read on every check, so a
/// sign-out from another process takes effect on the next mutation attempt.
/// The last observed identity is published through a watch channel.
pub struct SessionGate<K: KeyValueStore> {
    store: Arc<K>,
    notifier: Arc<dyn Notifier>,
    identity: watch::Sender<Option<SessionIdentity>>,
}

impl<K: KeyValueStore> SessionGate<K> {
    pub fn new(store: Arc<K>, notifier: Arc<dyn Notifier>) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            store,
            notifier,
            identity,
        }
    }

    /// Never errors: unreadable, corrupt, or wrongly shaped slots count as signed out.
    pub async fn is_authenticated(&self) -> bool {
        self.refresh().await.is_some()
    }

    /// Returns `true` when signed in. Otherwise warns the user once and returns `false`.
    pub async fn require_auth_or_warn(&self) -> bool {
        if self.is_authenticated().await {
            return true;
        }
        self.notifier.warn(SIGN_IN_REQUIRED);
        false
    }

    /// The identity seen at the last check.
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.identity.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SessionIdentity>> {
        self.identity.subscribe()
    }

    pub async fn store_identity(&self, identity: &SessionIdentity) -> Result<(), StorageError> {
        let raw = serde_json::to_string(identity).map_err(std::io::Error::from)?;
        self.store.set(SESSION_SLOT, &raw).await?;
        self.publish(Some(identity.clone()));
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), StorageError> {
        self.store.remove(SESSION_SLOT).await?;
        self.publish(None);
        Ok(())
    }

    /// Re-reads the slot when the event concerns it.
    pub async fn handle_storage_event(&self, event: &StorageEvent) {
        if event.key == SESSION_SLOT {
            self.refresh().await;
        }
    }

    /// Follows storage changes until the sender side goes away.
    pub async fn listen(&self, mut events: broadcast::Receiver<StorageEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.handle_storage_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Storage events lagged, re-reading session");
                    self.refresh().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    async fn refresh(&self) -> Option<SessionIdentity> {
        let current = match self.store.get(SESSION_SLOT).await {
            Ok(raw) => raw.as_deref().and_then(SessionIdentity::from_json),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read session slot");
                None
            }
        };
        self.publish(current.clone());
        current
    }

    fn publish(&self, value: Option<SessionIdentity>) {
        self.identity.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::adapters::outbound::MemoryKeyValueStore;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Collects warnings for assertions.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub(crate) fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn warn(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    pub(crate) fn ayu() -> SessionIdentity {
        SessionIdentity {
            id: 1,
            username: "ayu".to_string(),
            email: "ayu@example.com".to_string(),
        }
    }

    fn gate(
        store: Arc<MemoryKeyValueStore>,
    ) -> (SessionGate<MemoryKeyValueStore>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (SessionGate::new(store, notifier.clone()), notifier)
    }

    #[tokio::test]
    async fn signed_out_guard_warns_once() {
        let (gate, notifier) = gate(Arc::new(MemoryKeyValueStore::new()));

        assert!(!gate.require_auth_or_warn().await);
        assert_eq!(notifier.messages(), vec![SIGN_IN_REQUIRED.to_string()]);
    }

    #[tokio::test]
    async fn signed_in_guard_is_silent() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (gate, notifier) = gate(store);
        gate.store_identity(&ayu()).await.unwrap();

        assert!(gate.require_auth_or_warn().await);
        assert!(notifier.messages().is_empty());
        assert_eq!(gate.identity(), Some(ayu()));
    }

    #[tokio::test]
    async fn malformed_slot_counts_as_signed_out() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (gate, _) = gate(store.clone());

        for raw in [
            "not json",
            "[1, 2]",
            r#"{"id": "1", "username": "ayu", "email": "a@b.co"}"#,
            r#"{"id": 1, "username": "ayu"}"#,
        ] {
            store.set(SESSION_SLOT, raw).await.unwrap();
            assert!(!gate.is_authenticated().await, "{raw}");
        }
    }

    #[tokio::test]
    async fn sign_out_clears_slot_and_cell() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (gate, _) = gate(store.clone());
        gate.store_identity(&ayu()).await.unwrap();

        gate.sign_out().await.unwrap();

        assert_eq!(store.get(SESSION_SLOT).await.unwrap(), None);
        assert_eq!(gate.identity(), None);
        assert!(!gate.is_authenticated().await);
    }

    #[tokio::test]
    async fn external_sign_out_blocks_next_mutation() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (gate, notifier) = gate(store.clone());
        gate.store_identity(&ayu()).await.unwrap();

        store.remove(SESSION_SLOT).await.unwrap();

        assert!(!gate.require_auth_or_warn().await);
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn other_gate_sees_sign_in_through_events() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (writer, _) = gate(store.clone());
        let (reader, _) = gate(store.clone());
        let reader = Arc::new(reader);

        let events = store.subscribe().unwrap();
        let mut cell = reader.subscribe();
        let listener = tokio::spawn({
            let reader = reader.clone();
            async move { reader.listen(events).await }
        });

        writer.store_identity(&ayu()).await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), cell.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*cell.borrow(), Some(ayu()));

        listener.abort();
    }

    #[tokio::test]
    async fn lagging_listener_rereads_the_slot() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (gate, _) = gate(store.clone());
        let gate = Arc::new(gate);
        let events = store.subscribe().unwrap();
        let mut cell = gate.subscribe();

        // The session event is pushed out of the channel before anyone reads it.
        store
            .set(SESSION_SLOT, &serde_json::to_string(&ayu()).unwrap())
            .await
            .unwrap();
        for i in 0..40 {
            store.set("theme", &i.to_string()).await.unwrap();
        }

        let listener = tokio::spawn({
            let gate = gate.clone();
            async move { gate.listen(events).await }
        });

        tokio::time::timeout(Duration::from_secs(1), cell.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*cell.borrow(), Some(ayu()));

        listener.abort();
    }

    #[tokio::test]
    async fn unrelated_keys_are_ignored() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (gate, _) = gate(store.clone());
        store
            .set(SESSION_SLOT, &serde_json::to_string(&ayu()).unwrap())
            .await
            .unwrap();

        gate.handle_storage_event(&StorageEvent {
            key: "theme".to_string(),
        })
        .await;
        assert_eq!(gate.identity(), None);

        gate.handle_storage_event(&StorageEvent {
            key: SESSION_SLOT.to_string(),
        })
        .await;
        assert_eq!(gate.identity(), Some(ayu()));
    }
}
