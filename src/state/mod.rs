//! State primitives and handlers.
//!
//! - `store` - value-semantics wrappers every handler is built on
//! - `types` - shared domain types and rule constants
//! - `player` - per-phase player shapes and the play-phase player handler
//! - `enrolment`, `setup`, `play` - public state of each phase
//! - `private` - undrawn decks and price tiers, never broadcast
//! - `backup` - the single undo slot
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── Handler ────────────────────────────┐
//! │                                                                  │
//! │   from_dto(dto) ─▶ Writable<T> / Keyed<K, V> fields ─▶ to_dto()  │
//! │                         │                                        │
//! │                         └─ domain operations only                │
//! │                            (sail_to, load_good, draw_card, ...)  │
//! │                                                                  │
//! │   Every read hands out a clone; no caller holds a reference      │
//! │   into live state.                                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod backup;
pub mod enrolment;
pub mod play;
pub mod player;
pub mod private;
pub mod setup;
pub mod store;
pub mod types;

pub use backup::{BackupHandler, BackupSnapshot};
pub use enrolment::{EnrolmentStateDto, EnrolmentStateHandler, EnrolmentStatus};
pub use play::{PlayStateDto, PlayStateHandler, TempleProgress};
pub use player::{EnrolledPlayer, PlayerDto, PlayerEntity, PlayerHandler, SetupPlayer};
pub use private::{PrivateStateDto, PrivateStateHandler};
pub use setup::{SetupStateDto, SetupStateHandler, SpecialistOffer};
pub use store::{Keyed, Writable};
