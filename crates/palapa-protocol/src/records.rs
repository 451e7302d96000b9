//! Record types: the authoritative state of a room and its vault.
//!
//! These are plain data. The engine (`palapa-room`) owns the rules for
//! mutating them; this crate only defines their shape and a few read-only
//! helpers so callers can reason about a record they fetched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, Identity, Lamports, UnixTimestamp};

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// Created ─┬─→ OpenForJoining ─→ InProgress ─→ Finished
///          │          │              ↑
///          │          └──→ Cancelled │
///          ├─────────────→ Cancelled │
///          └─────────────────────────┘
/// ```
///
/// `Created` and `OpenForJoining` are both "not yet started" and behave
/// identically in every check. New rooms are created as `OpenForJoining`.
/// `Finished` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomStatus {
    Created,
    OpenForJoining,
    InProgress,
    Finished,
    Cancelled,
}

impl RoomStatus {
    /// Returns `true` if the room has not started yet: it accepts joins
    /// and may be started or cancelled.
    pub fn is_open(&self) -> bool {
        match self {
            Self::Created | Self::OpenForJoining => true,
            Self::InProgress | Self::Finished | Self::Cancelled => false,
        }
    }

    /// Returns `true` for `Finished` and `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Finished | Self::Cancelled => true,
            Self::Created | Self::OpenForJoining | Self::InProgress => false,
        }
    }

    /// Returns `true` if moving from `self` to `target` is a legal edge of
    /// the state machine.
    pub fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Created, Self::OpenForJoining) => true,
            (Self::Created | Self::OpenForJoining, Self::InProgress) => true,
            (Self::Created | Self::OpenForJoining, Self::Cancelled) => true,
            (Self::InProgress, Self::Finished) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::OpenForJoining => write!(f, "OpenForJoining"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomRecord
// ---------------------------------------------------------------------------

/// The durable state of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    /// The identity that created the room. Immutable.
    pub creator: Identity,
    /// Caller-chosen seed, 1..=32 bytes, unique per creator.
    pub room_seed: String,
    /// Derivation bump of the room address.
    pub bump: u8,
    /// Derivation bump of the vault address.
    pub vault_bump: u8,
    pub status: RoomStatus,
    /// Set exactly once, on the transition to `Finished`.
    pub winner: Option<Identity>,
    pub max_players: u16,
    /// Amount every player deposits on join.
    pub entry_fee: Lamports,
    /// Joined players in join order. Never contains duplicates.
    pub players: Vec<Identity>,
    pub creation_timestamp: UnixTimestamp,
    /// Set when the room reaches `Finished` or `Cancelled`.
    pub end_timestamp: Option<UnixTimestamp>,
}

impl RoomRecord {
    pub fn contains_player(&self, player: &Identity) -> bool {
        self.players.contains(player)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= usize::from(self.max_players)
    }

    /// The vault balance this record implies before payout.
    ///
    /// Returns `None` on overflow.
    pub fn expected_pool(&self) -> Option<Lamports> {
        let count = Lamports::try_from(self.players.len()).ok()?;
        self.entry_fee.checked_mul(count)
    }
}

// ---------------------------------------------------------------------------
// VaultRecord
// ---------------------------------------------------------------------------

/// A fund-custody record. Holds a balance and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub address: Address,
    pub bump: u8,
    pub balance: Lamports,
    /// `true` once the vault has been drained and reclaimed.
    pub closed: bool,
}
