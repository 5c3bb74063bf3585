//! Session layer: one coordinator per game, the registry that owns them,
//! and the collaborators they talk to.
//!
//! ```text
//! ┌──────────────────────── SessionRegistry ────────────────────────┐
//! │  session id ─▶ Mutex<SessionCoordinator>                        │
//! │                   │                                             │
//! │                   ├─ PhaseProcessor (enrolment|setup|play|done) │
//! │                   ├─ identities, owner, chat                    │
//! │                   └─ StdRng                                     │
//! │                                                                 │
//! │  Collaborators: SessionStore · Transport · TextMeasure          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod collaborators;
pub mod coordinator;
pub mod message;
pub mod registry;
pub mod snapshot;

pub use collaborators::{
    ChannelTransport, Collaborators, Delivery, MemoryStore, Recipient, SessionStore,
    TextConstraints, TextMeasure, Transport, WidthMeasure,
};
pub use coordinator::SessionCoordinator;
pub use message::{Audience, OutboundMessage, PhaseView, Response, SessionDto};
pub use registry::{RegistryError, SessionRegistry};
pub use snapshot::SessionSnapshot;
