//! Tradewinds State Library
//!
//! Authoritative session engine for Tradewinds, a turn-based trading game
//! for two to four players.
//!
//! # Overview
//!
//! - **State primitives and handlers** - value-semantics wrappers and one
//!   handler per domain aggregate, see [`state`].
//!
//! - **Validation** - declarative field tests that turn untyped payloads into
//!   typed ones, see [`validation`].
//!
//! - **Phase processors** - rule engines for enrolment, setup and play, see
//!   [`processor`].
//!
//! - **Sessions** - identity resolution, cross-phase actions, persistence and
//!   delivery, see [`session`].
//!
//! # Design Principles
//!
//! 1. **Draft, then commit** - a play action runs on a copy; failures leave
//!    the live state untouched.
//!
//! 2. **Clients see one error** - the cause of a refusal is logged, never sent.
//!
//! 3. **No networking** - transport and storage are injected collaborators.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tradewinds_state::{Config, session::{Collaborators, SessionRegistry}};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let (collaborators, mut deliveries) = Collaborators::in_memory();
//! let registry = SessionRegistry::new(Config::default().session, collaborators);
//!
//! let session_id = registry.create_session().await.unwrap();
//! let frame = json!({
//!     "identity": "player-1",
//!     "message": { "action": "enrol", "payload": { "color": "red", "name": "Ada" } }
//! });
//! registry.dispatch(&session_id, &frame).await.unwrap();
//!
//! let delivery = deliveries.recv().await.unwrap();
//! assert!(!delivery.message.is_error());
//! # });
//! ```

pub mod action;
pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod map;
pub mod processor;
pub mod session;
pub mod state;
pub mod validation;

pub use action::{Action, PlayCommand};
pub use config::{Config, ConfigError, LoggingSettings, SessionSettings};
pub use error::{ActionError, ActionResult, Rejection, RuleViolation, StoreError, GENERIC_ERROR};
pub use logging::init_logging;
pub use processor::{GameResults, PhaseProcessor, PlayOutcome};
pub use session::{SessionCoordinator, SessionRegistry};
