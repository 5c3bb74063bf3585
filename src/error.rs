//! Error types.
//!
//! None of these are shown to clients. The coordinator logs the cause and
//! answers with [`GENERIC_ERROR`].

use thiserror::Error;

use crate::state::types::{LocationAction, Phase, PlayerColor};

/// The only error text a client ever receives.
pub const GENERIC_ERROR: &str = "The action could not be processed";

/// A payload failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload rejected: {}", .messages.join("; "))]
pub struct Rejection {
    pub messages: Vec<String>,
}

impl Rejection {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }
}

/// A well-formed action that the current rules do not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("action is not legal in the {0} phase")]
    WrongPhase(Phase),

    #[error("sender is not enrolled in this session")]
    UnknownIdentity,

    #[error("sender is already enrolled")]
    AlreadyEnrolled,

    #[error("enrolment is closed")]
    EnrolmentClosed,

    #[error("color {0} is already taken")]
    ColorTaken(PlayerColor),

    #[error("name is already taken")]
    NameTaken,

    #[error("name does not fit: {0}")]
    NameRejected(String),

    #[error("only the session owner may do this")]
    NotOwner,

    #[error("at least {0} players are required")]
    NotEnoughPlayers(usize),

    #[error("it is not this player's pick")]
    NotYourPick,

    #[error("specialist is not available")]
    SpecialistUnavailable,

    #[error("not every player has picked a specialist")]
    PicksIncomplete,

    #[error("not enough starting coordinates were supplied")]
    MissingCoordinates,

    #[error("it is not this player's turn")]
    NotActivePlayer,

    #[error("player is handling the rival")]
    HandlingRival,

    #[error("no move actions left")]
    NoMovesLeft,

    #[error("destination is not reachable")]
    DestinationUnavailable,

    #[error("ship is not anchored")]
    NotAnchored,

    #[error("location action {0} is not available")]
    ActionUnavailable(LocationAction),

    #[error("player is not at the trade's location")]
    LocationMismatch,

    #[error("trade is not feasible with the current cargo")]
    TradeNotFeasible,

    #[error("not enough coins")]
    InsufficientCoins,

    #[error("not enough favor")]
    InsufficientFavor,

    #[error("not enough free cargo space")]
    CargoFull,

    #[error("cargo cannot grow any further")]
    CargoAtCapacity,

    #[error("item is not in cargo")]
    ItemNotInCargo,

    #[error("item cannot be loaded here")]
    WrongGood,

    #[error("favor was already spent this turn")]
    AlreadyPrivileged,

    #[error("this session has no rival")]
    NoRival,

    #[error("rival is not controllable by this player")]
    RivalNotControllable,

    #[error("rival has moves remaining")]
    RivalMovesRemaining,

    #[error("rival is not at the market")]
    RivalNotAtMarket,

    #[error("there is nothing to undo")]
    NoBackup,

    #[error("the reset was refused")]
    ResetRefused,
}

/// Any failure while processing one action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] Rejection),

    #[error(transparent)]
    Rule(#[from] RuleViolation),

    /// Broken internal state. Never caused by a client mistake.
    #[error("internal error: {0}")]
    Fatal(String),
}

impl ActionError {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Persistence collaborator failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize session {0}: {1}")]
    Serialization(String, serde_json::Error),

    #[error("failed to deserialize session {0}: {1}")]
    Deserialization(String, serde_json::Error),

    #[error("store backend failed: {0}")]
    Backend(String),
}
