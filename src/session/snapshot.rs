//! Persisted form of a session.
//!
//! Unlike [`SessionDto`](crate::session::message::SessionDto) this holds
//! everything, hidden decks and the undo slot included. Exactly one phase
//! payload is present, the one matching `phase`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ActionError, ActionResult};
use crate::processor::{
    EnrolmentProcessor, GameResults, PhaseProcessor, PlayProcessor, SetupProcessor,
};
use crate::state::backup::BackupSnapshot;
use crate::state::enrolment::EnrolmentStateDto;
use crate::state::play::PlayStateDto;
use crate::state::player::PlayerDto;
use crate::state::private::PrivateStateDto;
use crate::state::setup::SetupStateDto;
use crate::state::types::{ChatEntry, Phase, PlayerColor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySnapshot {
    pub players: Vec<PlayerDto>,
    pub state: PlayStateDto,
    pub private: PrivateStateDto,
    pub backup: Option<BackupSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: Phase,
    /// Identity of the session owner.
    pub owner: Option<String>,
    pub identities: BTreeMap<String, PlayerColor>,
    pub chat: Vec<ChatEntry>,
    #[serde(default)]
    pub enrolment: Option<EnrolmentStateDto>,
    #[serde(default)]
    pub setup: Option<SetupStateDto>,
    #[serde(default)]
    pub play: Option<PlaySnapshot>,
    #[serde(default)]
    pub conclusion: Option<GameResults>,
}

impl SessionSnapshot {
    pub fn capture(
        session_id: &str,
        owner: Option<String>,
        identities: BTreeMap<String, PlayerColor>,
        chat: Vec<ChatEntry>,
        processor: &PhaseProcessor,
    ) -> Self {
        let mut snapshot = Self {
            session_id: session_id.to_string(),
            phase: processor.phase(),
            owner,
            identities,
            chat,
            enrolment: None,
            setup: None,
            play: None,
            conclusion: None,
        };
        match processor {
            PhaseProcessor::Enrolment(p) => snapshot.enrolment = Some(p.to_dto()),
            PhaseProcessor::Setup(p) => snapshot.setup = Some(p.to_dto()),
            PhaseProcessor::Play(p) => {
                snapshot.play = Some(PlaySnapshot {
                    players: p.players(),
                    state: p.state(),
                    private: p.private_state(),
                    backup: p.backup(),
                })
            }
            PhaseProcessor::Conclusion(results) => snapshot.conclusion = Some(results.clone()),
        }
        snapshot
    }

    /// Rebuild the phase processor.
    ///
    /// Fails with a fatal error when the payloads do not match the phase, or
    /// when an identity maps to a color nobody plays.
    pub fn restore_processor(&self) -> ActionResult<PhaseProcessor> {
        let payloads = [
            self.enrolment.is_some(),
            self.setup.is_some(),
            self.play.is_some(),
            self.conclusion.is_some(),
        ];
        if payloads.iter().filter(|present| **present).count() != 1 {
            return Err(self.corrupted("expected exactly one phase payload"));
        }

        let processor = match self.phase {
            Phase::Enrolment => self
                .enrolment
                .clone()
                .map(|dto| PhaseProcessor::Enrolment(EnrolmentProcessor::from_dto(dto))),
            Phase::Setup => self
                .setup
                .clone()
                .map(|dto| PhaseProcessor::Setup(SetupProcessor::from_dto(dto))),
            Phase::Play => self.play.clone().map(|p| {
                PhaseProcessor::Play(PlayProcessor::from_parts(
                    p.players, p.state, p.private, p.backup,
                ))
            }),
            Phase::Conclusion => self.conclusion.clone().map(PhaseProcessor::Conclusion),
        }
        .ok_or_else(|| self.corrupted("payload does not match phase"))?;

        if let Some(play) = &self.play {
            if play.players.iter().filter(|p| p.is_active).count() != 1 {
                return Err(self.corrupted("play needs exactly one active player"));
            }
        }
        if let Some(owner) = &self.owner {
            if !self.identities.contains_key(owner) {
                return Err(self.corrupted("owner is not enrolled"));
            }
        }
        if let Some(color) = self
            .identities
            .values()
            .find(|color| processor.name_of(**color).is_none())
        {
            return Err(self.corrupted(&format!("identity mapped to absent color {color}")));
        }

        Ok(processor)
    }

    fn corrupted(&self, reason: &str) -> ActionError {
        ActionError::fatal(format!("corrupted snapshot {}: {reason}", self.session_id))
    }
}
