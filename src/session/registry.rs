//! All live sessions of one host.
//!
//! Sessions share nothing. Each sits behind its own async mutex so that its
//! actions run one at a time, while different sessions progress in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::error::{ActionError, Rejection, StoreError};
use crate::session::collaborators::Collaborators;
use crate::session::coordinator::SessionCoordinator;
use crate::validation::schemas::parse_inbound;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no session with id {0}")]
    UnknownSession(String),

    #[error("malformed inbound frame: {0}")]
    MalformedFrame(#[from] Rejection),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("session {session_id} could not be restored: {source}")]
    Corrupted {
        session_id: String,
        source: ActionError,
    },
}

pub type SharedSession = Arc<Mutex<SessionCoordinator>>;

pub struct SessionRegistry {
    sessions: DashMap<String, SharedSession>,
    settings: SessionSettings,
    collaborators: Collaborators,
}

impl SessionRegistry {
    pub fn new(settings: SessionSettings, collaborators: Collaborators) -> Self {
        Self {
            sessions: DashMap::new(),
            settings,
            collaborators,
        }
    }

    /// Open a new session in enrolment and persist it.
    #[instrument(skip(self))]
    pub async fn create_session(&self) -> Result<String, RegistryError> {
        let session_id = Uuid::new_v4().to_string();
        let coordinator = SessionCoordinator::new(
            session_id.clone(),
            self.settings.clone(),
            self.collaborators.clone(),
        );
        self.collaborators.store.save(&coordinator.snapshot()).await?;
        self.sessions
            .insert(session_id.clone(), Arc::new(Mutex::new(coordinator)));

        info!(session = %session_id, "session created");
        Ok(session_id)
    }

    /// A live session, loading it from the store on first use.
    pub async fn session(&self, session_id: &str) -> Result<SharedSession, RegistryError> {
        if let Some(session) = self.sessions.get(session_id) {
            return Ok(Arc::clone(session.value()));
        }

        let snapshot = self
            .collaborators
            .store
            .load(session_id)
            .await?
            .ok_or_else(|| RegistryError::UnknownSession(session_id.to_string()))?;
        let coordinator =
            SessionCoordinator::restore(snapshot, self.settings.clone(), self.collaborators.clone())
                .map_err(|source| RegistryError::Corrupted {
                    session_id: session_id.to_string(),
                    source,
                })?;
        debug!(session = %session_id, "session loaded from store");

        // Another task may have loaded it meanwhile; keep whichever came first.
        let session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(coordinator)));
        Ok(Arc::clone(session.value()))
    }

    /// Route a raw `{identity, message}` frame to its session.
    #[instrument(skip(self, frame))]
    pub async fn dispatch(&self, session_id: &str, frame: &Value) -> Result<(), RegistryError> {
        let inbound = parse_inbound(frame)?;
        let session = self.session(session_id).await?;
        let mut coordinator = session.lock().await;
        coordinator.handle(&inbound.identity, &inbound.message).await;
        Ok(())
    }

    /// Drop a session from memory. It stays in the store.
    pub fn evict(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::collaborators::{Delivery, Recipient};
    use crate::session::message::OutboundMessage;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn registry() -> (SessionRegistry, UnboundedReceiver<Delivery>) {
        let (collaborators, deliveries) = Collaborators::in_memory();
        (
            SessionRegistry::new(SessionSettings::default(), collaborators),
            deliveries,
        )
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let (registry, _deliveries) = registry();
        let frame = json!({ "identity": "a", "message": { "action": "undo" } });
        assert!(matches!(
            registry.dispatch("missing", &frame).await,
            Err(RegistryError::UnknownSession(_))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_broadcasts_and_reloads() {
        let (registry, mut deliveries) = registry();
        let session_id = registry.create_session().await.unwrap();
        assert_eq!(registry.len(), 1);

        let frame = json!({
            "identity": "id-ada",
            "message": { "action": "enrol", "payload": { "color": "purple", "name": "Ada" } }
        });
        registry.dispatch(&session_id, &frame).await.unwrap();

        let delivery = deliveries.recv().await.unwrap();
        assert_eq!(delivery.recipient, Recipient::Session(session_id.clone()));
        assert!(matches!(delivery.message, OutboundMessage::State(_)));

        assert!(registry.evict(&session_id));
        assert!(!registry.contains(&session_id));

        let session = registry.session(&session_id).await.unwrap();
        let restored = session.lock().await;
        assert_eq!(restored.session_id(), session_id);
        assert_eq!(
            restored
                .processor()
                .name_of(crate::state::types::PlayerColor::Purple)
                .as_deref(),
            Some("Ada")
        );
    }

    #[tokio::test]
    async fn test_malformed_frame() {
        let (registry, _deliveries) = registry();
        let session_id = registry.create_session().await.unwrap();
        assert!(matches!(
            registry.dispatch(&session_id, &json!({ "message": {} })).await,
            Err(RegistryError::MalformedFrame(_))
        ));
    }
}
