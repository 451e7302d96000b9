//! Request and response messages.
//!
//! A [`Request`] is what the hosting environment hands the engine after it
//! has authenticated the signer. A [`Response`] is what goes back: either a
//! [`Receipt`] describing the committed change, or a typed error.

use serde::{Deserialize, Serialize};

use crate::{Address, Identity, Lamports, RoomRecord};

// ---------------------------------------------------------------------------
// Instruction
// ---------------------------------------------------------------------------

/// The operation a request asks for.
///
/// `#[serde(tag = "type")]` gives internally tagged JSON:
/// `{ "type": "JoinRoom", "roomSeed": "r1" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Instruction {
    /// Signer becomes the creator of a new room.
    CreateRoom {
        room_seed: String,
        max_players: u16,
        entry_fee: Lamports,
    },

    /// Signer deposits the entry fee and joins.
    JoinRoom { room_seed: String },

    /// Creator starts the room, possibly under-filled.
    StartRoom { room_seed: String },

    /// Creator declares the winner and releases the vault.
    ///
    /// `winner_account` and `service_fee_recipient` are the accounts the
    /// caller wants credited; they must match the declared winner and the
    /// configured fee recipient.
    AnnounceWinner {
        room_seed: String,
        winner: Identity,
        winner_account: Identity,
        service_fee_recipient: Identity,
    },

    /// Creator cancels a room nobody joined.
    CancelRoom { room_seed: String },
}

impl Instruction {
    /// The seed every instruction carries.
    pub fn room_seed(&self) -> &str {
        match self {
            Self::CreateRoom { room_seed, .. }
            | Self::JoinRoom { room_seed }
            | Self::StartRoom { room_seed }
            | Self::AnnounceWinner { room_seed, .. }
            | Self::CancelRoom { room_seed } => room_seed,
        }
    }

    /// Operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "createRoom",
            Self::JoinRoom { .. } => "joinRoom",
            Self::StartRoom { .. } => "startRoom",
            Self::AnnounceWinner { .. } => "announceWinner",
            Self::CancelRoom { .. } => "cancelRoom",
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// An authenticated request.
///
/// The caller derives `room` and `vault` itself and sends them along; the
/// engine recomputes both and rejects the request if either differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Caller-chosen correlation id, echoed in the response.
    #[serde(default)]
    pub id: u64,
    /// The authenticated identity that signed the request.
    pub signer: Identity,
    pub room: Address,
    pub vault: Address,
    pub instruction: Instruction,
}

// ---------------------------------------------------------------------------
// RoomEvent / Receipt
// ---------------------------------------------------------------------------

/// What a successful operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum RoomEvent {
    RoomCreated {
        creator: Identity,
        max_players: u16,
        entry_fee: Lamports,
    },
    PlayerJoined {
        player: Identity,
        amount: Lamports,
        player_count: usize,
    },
    RoomStarted { player_count: usize },
    WinnerAnnounced {
        winner: Identity,
        pool: Lamports,
        prize_share: Lamports,
        service_fee: Lamports,
        service_fee_recipient: Identity,
    },
    RoomCancelled,
}

/// The result of a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub room: Address,
    pub vault: Address,
    /// The room record after the change.
    pub record: RoomRecord,
    /// The vault balance after the change.
    pub vault_balance: Lamports,
    pub event: RoomEvent,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Broad class of a failure, used by callers to decide whether to resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Bad input. Resubmit with corrected values.
    Validation,
    /// The transition is illegal in the room's current state.
    State,
    /// The signer is not allowed to do this.
    Authorization,
    /// Mismatched accounts, arithmetic failure, or an engine defect.
    FundIntegrity,
    /// The engine could not service the request at all.
    Unavailable,
}

/// The reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    /// The operation committed.
    Ok { id: u64, receipt: Receipt },
    /// The operation failed; nothing changed.
    Error {
        id: u64,
        code: u32,
        name: String,
        kind: ErrorKind,
        message: String,
    },
    /// The request could not be decoded.
    Rejected { message: String },
}
