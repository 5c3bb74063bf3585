//! Single-slot undo buffer.
//!
//! Holds at most one earlier state. Taking it clears the slot, so a second
//! undo in a row has nothing to restore.

use serde::{Deserialize, Serialize};

use crate::state::play::PlayStateDto;
use crate::state::player::PlayerDto;
use crate::state::store::Writable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub players: Vec<PlayerDto>,
    pub play: PlayStateDto,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackupHandler {
    slot: Writable<Option<BackupSnapshot>>,
}

impl BackupHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dto(dto: Option<BackupSnapshot>) -> Self {
        Self {
            slot: Writable::new(dto),
        }
    }

    pub fn to_dto(&self) -> Option<BackupSnapshot> {
        self.slot.get()
    }

    pub fn has_backup(&self) -> bool {
        self.slot.inspect(Option::is_some)
    }

    /// Replace whatever was retained with `snapshot`.
    pub fn save(&mut self, snapshot: BackupSnapshot) {
        self.slot.set(Some(snapshot));
    }

    /// Retrieve the retained snapshot and clear the slot.
    pub fn take(&mut self) -> Option<BackupSnapshot> {
        let snapshot = self.slot.get();
        self.slot.set(None);
        snapshot
    }

    pub fn clear(&mut self) {
        self.slot.set(None);
    }
}
