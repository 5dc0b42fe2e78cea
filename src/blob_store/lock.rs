//! Holding lock state machine.
//!
//! A Holding starts `Open` and becomes `Locked` on an explicit lock call.
//! `Locked` is terminal and locking again is a no-op.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldingLockState {
    #[default]
    Open,
    Locked,
}

/// What a lock call did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTransition {
    Locked,
    AlreadyLocked,
}

impl HoldingLockState {
    pub fn lock(&mut self) -> LockTransition {
        match self {
            HoldingLockState::Open => {
                *self = HoldingLockState::Locked;
                LockTransition::Locked
            }
            HoldingLockState::Locked => LockTransition::AlreadyLocked,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, HoldingLockState::Locked)
    }

    /// Track bytes may only be written while the Holding is open.
    pub fn accepts_track_writes(&self) -> bool {
        !self.is_locked()
    }

    /// Album art stays writable after locking; only the music namespace is
    /// frozen.
    pub fn accepts_album_art_writes(&self) -> bool {
        true
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingLockState::Open => "OPEN",
            HoldingLockState::Locked => "LOCKED",
        }
    }
}
