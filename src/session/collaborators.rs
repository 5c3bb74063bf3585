//! Services the coordinator depends on but does not own.
//!
//! Each is injected as an `Arc<dyn ...>`, so hosts can swap in a database,
//! a websocket fan-out or a font-aware measurer without touching game code.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use unicode_width::UnicodeWidthStr;

use crate::error::StoreError;
use crate::session::message::OutboundMessage;
use crate::session::snapshot::SessionSnapshot;

/// Load and save complete session snapshots by id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<SessionSnapshot>, StoreError>;

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError>;
}

/// Deliver outbound messages to clients.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send to a single connected client.
    async fn transmit(&self, recipient: &str, message: &OutboundMessage);

    /// Send to every client attached to a session.
    async fn broadcast(&self, session_id: &str, message: &OutboundMessage);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextConstraints {
    pub max_width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureRejection {
    #[error("text is empty")]
    Empty,

    #[error("text contains control characters")]
    ControlCharacters,

    #[error("text is {width} columns wide, at most {max} allowed")]
    TooWide { width: usize, max: usize },
}

/// Decide whether a piece of text fits the space reserved for it.
pub trait TextMeasure: Send + Sync {
    fn measure(&self, text: &str, constraints: TextConstraints) -> Result<(), MeasureRejection>;
}

/// Keeps serialized snapshots in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|json| {
                serde_json::from_str(json)
                    .map_err(|e| StoreError::Deserialization(session_id.to_string(), e))
            })
            .transpose()
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| StoreError::Serialization(snapshot.session_id.clone(), e))?;
        self.sessions
            .write()
            .await
            .insert(snapshot.session_id.clone(), json);
        Ok(())
    }
}

/// Counts terminal display columns, so wide glyphs cost two.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidthMeasure;

impl TextMeasure for WidthMeasure {
    fn measure(&self, text: &str, constraints: TextConstraints) -> Result<(), MeasureRejection> {
        if text.trim().is_empty() {
            return Err(MeasureRejection::Empty);
        }
        if text.chars().any(char::is_control) {
            return Err(MeasureRejection::ControlCharacters);
        }
        let width = text.width();
        if width > constraints.max_width {
            return Err(MeasureRejection::TooWide {
                width,
                max: constraints.max_width,
            });
        }
        Ok(())
    }
}

/// Where a delivery was addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Client(String),
    Session(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub recipient: Recipient,
    pub message: OutboundMessage,
}

/// Hands every delivery to a channel; the host pumps it into its sockets.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<Delivery>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn push(&self, recipient: Recipient, message: &OutboundMessage) {
        // A closed receiver means the host is shutting down.
        let _ = self.sender.send(Delivery {
            recipient,
            message: message.clone(),
        });
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn transmit(&self, recipient: &str, message: &OutboundMessage) {
        self.push(Recipient::Client(recipient.to_string()), message);
    }

    async fn broadcast(&self, session_id: &str, message: &OutboundMessage) {
        self.push(Recipient::Session(session_id.to_string()), message);
    }
}

/// The full set of collaborators handed to every coordinator.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn SessionStore>,
    pub transport: Arc<dyn Transport>,
    pub measure: Arc<dyn TextMeasure>,
}

impl Collaborators {
    pub fn new(
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
        measure: Arc<dyn TextMeasure>,
    ) -> Self {
        Self {
            store,
            transport,
            measure,
        }
    }

    /// In-memory store, channel transport and column-width measurement.
    pub fn in_memory() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (transport, receiver) = ChannelTransport::new();
        let collaborators = Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(transport),
            Arc::new(WidthMeasure),
        );
        (collaborators, receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIXTEEN: TextConstraints = TextConstraints { max_width: 16 };

    #[test]
    fn test_width_measure() {
        assert_eq!(WidthMeasure.measure("Ada", SIXTEEN), Ok(()));
        assert_eq!(WidthMeasure.measure("   ", SIXTEEN), Err(MeasureRejection::Empty));
        assert_eq!(
            WidthMeasure.measure("a\nb", SIXTEEN),
            Err(MeasureRejection::ControlCharacters)
        );
        // Nine wide glyphs take eighteen columns.
        assert_eq!(
            WidthMeasure.measure("航海者航海者航海者", SIXTEEN),
            Err(MeasureRejection::TooWide { width: 18, max: 16 })
        );
        assert_eq!(WidthMeasure.measure("航海者航海者航海", SIXTEEN), Ok(()));
    }

    #[tokio::test]
    async fn test_channel_transport_records_recipients() {
        let (transport, mut receiver) = ChannelTransport::new();
        let message = OutboundMessage::generic_error();

        transport.transmit("client-1", &message).await;
        transport.broadcast("session-1", &message).await;

        assert_eq!(
            receiver.recv().await.map(|d| d.recipient),
            Some(Recipient::Client("client-1".to_string()))
        );
        assert_eq!(
            receiver.recv().await.map(|d| d.recipient),
            Some(Recipient::Session("session-1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_memory_store_misses() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);
        assert!(store.load("nope").await.unwrap().is_none());
    }
}
