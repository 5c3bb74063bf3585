//! Outbound messages and the public session view.
//!
//! The view never includes hidden data: undrawn decks, the price pool,
//! the identity map and the undo slot stay server-side.

use serde::{Deserialize, Serialize};

use crate::error::GENERIC_ERROR;
use crate::processor::{GameResults, PhaseProcessor};
use crate::state::enrolment::EnrolmentStateDto;
use crate::state::play::PlayStateDto;
use crate::state::player::PlayerDto;
use crate::state::setup::SetupStateDto;
use crate::state::types::{ChatEntry, Phase, PlayerColor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayView {
    pub players: Vec<PlayerDto>,
    #[serde(flatten)]
    pub state: PlayStateDto,
}

/// Phase-specific part of the session view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhaseView {
    Enrolment(EnrolmentStateDto),
    Setup(SetupStateDto),
    Play(PlayView),
    Conclusion(GameResults),
}

impl PhaseView {
    pub fn of(processor: &PhaseProcessor) -> Self {
        match processor {
            PhaseProcessor::Enrolment(p) => Self::Enrolment(p.to_dto()),
            PhaseProcessor::Setup(p) => Self::Setup(p.to_dto()),
            PhaseProcessor::Play(p) => Self::Play(PlayView {
                players: p.players(),
                state: p.state(),
            }),
            PhaseProcessor::Conclusion(results) => Self::Conclusion(results.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub session_id: String,
    pub phase: Phase,
    pub session_owner: Option<PlayerColor>,
    pub chat: Vec<ChatEntry>,
    pub state: PhaseView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    State(Box<SessionDto>),
    Error { error: String },
}

impl OutboundMessage {
    pub fn generic_error() -> Self {
        Self::Error {
            error: GENERIC_ERROR.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Who receives a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Sender,
    Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub audience: Audience,
    pub message: OutboundMessage,
}

impl Response {
    pub fn to_sender(message: OutboundMessage) -> Self {
        Self {
            audience: Audience::Sender,
            message,
        }
    }

    pub fn to_session(message: OutboundMessage) -> Self {
        Self {
            audience: Audience::Session,
            message,
        }
    }
}
