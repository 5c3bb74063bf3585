//! Phase processors.
//!
//! Exactly one processor is active per session. Each one owns the state of
//! its phase and only accepts that phase's actions.
//!
//! ```text
//!   Enrolment ──start_setup──▶ Setup ──start_play──▶ Play ──game over──▶ Conclusion
//!       ▲                                                                   │
//!       └──────────────────────────── declare_reset ────────────────────────┘
//! ```

pub mod enrolment;
pub mod play;
pub mod setup;

use crate::state::player::PlayerEntity;
use crate::state::types::{Phase, PlayerColor};

pub use enrolment::EnrolmentProcessor;
pub use play::{GameResults, PlayOutcome, PlayProcessor, PlayerResult};
pub use setup::SetupProcessor;

#[derive(Debug, Clone, PartialEq)]
pub enum PhaseProcessor {
    Enrolment(EnrolmentProcessor),
    Setup(SetupProcessor),
    Play(PlayProcessor),
    Conclusion(GameResults),
}

impl PhaseProcessor {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Enrolment(_) => Phase::Enrolment,
            Self::Setup(_) => Phase::Setup,
            Self::Play(_) => Phase::Play,
            Self::Conclusion(_) => Phase::Conclusion,
        }
    }

    /// Every player in the shape the current phase uses.
    pub fn players(&self) -> Vec<PlayerEntity> {
        match self {
            Self::Enrolment(p) => p.players().into_iter().map(PlayerEntity::Enrolled).collect(),
            Self::Setup(p) => p.players().into_iter().map(PlayerEntity::Setup).collect(),
            Self::Play(p) => p.players().into_iter().map(PlayerEntity::Playing).collect(),
            Self::Conclusion(r) => r.results.iter().cloned().map(PlayerEntity::Finished).collect(),
        }
    }

    /// Display name of `color`, in any phase.
    pub fn name_of(&self, color: PlayerColor) -> Option<String> {
        self.players()
            .into_iter()
            .find(|p| p.color() == color)
            .map(|p| p.name().to_string())
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        self.players().iter().any(|p| p.name() == name)
    }

    pub fn rename(&mut self, color: PlayerColor, name: String) -> bool {
        match self {
            Self::Enrolment(p) => p.rename(color, name),
            Self::Setup(p) => p.rename(color, name),
            Self::Play(p) => p.rename(color, name),
            Self::Conclusion(results) => results.rename(color, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::player::tests::make_player;
    use crate::state::player::EnrolledPlayer;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rename_in_enrolment() {
        let mut enrolment = EnrolmentProcessor::new();
        enrolment
            .enrol(EnrolledPlayer {
                color: PlayerColor::Yellow,
                name: "Ada".to_string(),
            })
            .unwrap();
        let mut processor = PhaseProcessor::Enrolment(enrolment);

        assert_eq!(processor.phase(), Phase::Enrolment);
        assert!(processor.is_name_taken("Ada"));
        assert!(processor.rename(PlayerColor::Yellow, "Bea".to_string()));
        assert_eq!(processor.name_of(PlayerColor::Yellow).as_deref(), Some("Bea"));
        assert!(!processor.is_name_taken("Ada"));
    }

    #[test]
    fn test_conclusion_names() {
        let ada = make_player(PlayerColor::Red, 1).to_dto();
        let mut bo = make_player(PlayerColor::Green, 2).to_dto();
        bo.name = "Bo".to_string();
        let mut processor = PhaseProcessor::Conclusion(GameResults::compile(&[ada, bo]));

        let players: Vec<(PlayerColor, String)> = processor
            .players()
            .iter()
            .map(|p| (p.color(), p.name().to_string()))
            .collect();
        assert_eq!(players.len(), 2);
        assert!(players.contains(&(PlayerColor::Green, "Bo".to_string())));
        assert!(matches!(processor.players()[0], PlayerEntity::Finished(_)));

        assert!(processor.is_name_taken("Bo"));
        assert!(processor.rename(PlayerColor::Green, "Bosun".to_string()));
        assert_eq!(processor.name_of(PlayerColor::Green).as_deref(), Some("Bosun"));
        assert!(!processor.is_name_taken("Bo"));
        assert_eq!(processor.name_of(PlayerColor::Yellow), None);
    }
}
