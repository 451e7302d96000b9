//! Error types for the engine.

use palapa_protocol::{Address, ErrorKind, Lamports};

/// Every distinguishable failure of a room operation.
///
/// Codes are stable: 6000 onward in declaration order. Callers switch on
/// [`EscrowError::code`] or [`EscrowError::kind`]; the display string is
/// for humans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EscrowError {
    #[error("Invalid number of maximum players specified (must be > 1).")]
    InvalidMaxPlayers,

    #[error("Entry fee must be greater than zero.")]
    InvalidEntryFee,

    #[error("Room seed is invalid (empty or too long).")]
    InvalidRoomSeed,

    #[error("Could not find a derivation bump for the record address.")]
    BumpSeedNotFound,

    #[error("Room is not in the correct state to be joined.")]
    RoomNotJoinable,

    #[error("The room is already full.")]
    RoomFull,

    #[error("This player has already joined the room.")]
    PlayerAlreadyJoined,

    #[error("The room is not in progress, cannot announce winner.")]
    RoomNotInProgress,

    #[error("The declared winner is not listed as a player in this room.")]
    WinnerNotInRoom,

    #[error("The provided winner account does not match the winner identity.")]
    WinnerAccountMismatch,

    #[error("Vault was not empty after payout. Check transfer logic.")]
    VaultNotEmptyAfterPayout,

    #[error("Unauthorized: Only the room creator can perform this action.")]
    Unauthorized,

    #[error("Room cannot be cancelled in its current state (must be Open/Created).")]
    CannotCancelRoomState,

    #[error("Room cannot be cancelled because players have already joined.")]
    CannotCancelRoomPlayersJoined,

    #[error("Arithmetic overflow during fee or payout calculation.")]
    CalculationOverflow,

    #[error("The provided service fee recipient does not match the configured recipient.")]
    InvalidServiceWallet,

    #[error("Insufficient funds in vault to cover calculated fees and payout.")]
    InsufficientFundsForPayout,

    #[error("Requested max players exceeds the engine's limit.")]
    MaxPlayersExceedsLimit,

    #[error("Invalid creator provided for address derivation.")]
    InvalidCreator,

    #[error("Room is not open, cannot be started.")]
    RoomNotOpenForStarting,

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance {
        needed: Lamports,
        available: Lamports,
    },

    #[error("a room already exists at {0}")]
    RoomAlreadyExists(Address),

    #[error("room {0} not found")]
    RoomNotFound(Address),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(Address),
}

impl EscrowError {
    /// Stable numeric code.
    pub fn code(&self) -> u32 {
        let ordinal = match self {
            Self::InvalidMaxPlayers => 0,
            Self::InvalidEntryFee => 1,
            Self::InvalidRoomSeed => 2,
            Self::BumpSeedNotFound => 3,
            Self::RoomNotJoinable => 4,
            Self::RoomFull => 5,
            Self::PlayerAlreadyJoined => 6,
            Self::RoomNotInProgress => 7,
            Self::WinnerNotInRoom => 8,
            Self::WinnerAccountMismatch => 9,
            Self::VaultNotEmptyAfterPayout => 10,
            Self::Unauthorized => 11,
            Self::CannotCancelRoomState => 12,
            Self::CannotCancelRoomPlayersJoined => 13,
            Self::CalculationOverflow => 14,
            Self::InvalidServiceWallet => 15,
            Self::InsufficientFundsForPayout => 16,
            Self::MaxPlayersExceedsLimit => 17,
            Self::InvalidCreator => 18,
            Self::RoomNotOpenForStarting => 19,
            Self::InsufficientBalance { .. } => 20,
            Self::RoomAlreadyExists(_) => 21,
            Self::RoomNotFound(_) => 22,
            Self::Unavailable(_) => 23,
        };
        6000 + ordinal
    }

    /// Variant name, as sent on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidMaxPlayers => "InvalidMaxPlayers",
            Self::InvalidEntryFee => "InvalidEntryFee",
            Self::InvalidRoomSeed => "InvalidRoomSeed",
            Self::BumpSeedNotFound => "BumpSeedNotFound",
            Self::RoomNotJoinable => "RoomNotJoinable",
            Self::RoomFull => "RoomFull",
            Self::PlayerAlreadyJoined => "PlayerAlreadyJoined",
            Self::RoomNotInProgress => "RoomNotInProgress",
            Self::WinnerNotInRoom => "WinnerNotInRoom",
            Self::WinnerAccountMismatch => "WinnerAccountMismatch",
            Self::VaultNotEmptyAfterPayout => "VaultNotEmptyAfterPayout",
            Self::Unauthorized => "Unauthorized",
            Self::CannotCancelRoomState => "CannotCancelRoomState",
            Self::CannotCancelRoomPlayersJoined => "CannotCancelRoomPlayersJoined",
            Self::CalculationOverflow => "CalculationOverflow",
            Self::InvalidServiceWallet => "InvalidServiceWallet",
            Self::InsufficientFundsForPayout => "InsufficientFundsForPayout",
            Self::MaxPlayersExceedsLimit => "MaxPlayersExceedsLimit",
            Self::InvalidCreator => "InvalidCreator",
            Self::RoomNotOpenForStarting => "RoomNotOpenForStarting",
            Self::InsufficientBalance { .. } => "InsufficientBalance",
            Self::RoomAlreadyExists(_) => "RoomAlreadyExists",
            Self::RoomNotFound(_) => "RoomNotFound",
            Self::Unavailable(_) => "Unavailable",
        }
    }

    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMaxPlayers
            | Self::InvalidEntryFee
            | Self::InvalidRoomSeed
            | Self::MaxPlayersExceedsLimit => ErrorKind::Validation,

            Self::RoomNotJoinable
            | Self::RoomFull
            | Self::PlayerAlreadyJoined
            | Self::RoomNotInProgress
            | Self::RoomNotOpenForStarting
            | Self::CannotCancelRoomState
            | Self::CannotCancelRoomPlayersJoined
            | Self::WinnerNotInRoom
            | Self::RoomAlreadyExists(_)
            | Self::RoomNotFound(_) => ErrorKind::State,

            Self::Unauthorized | Self::InvalidCreator => ErrorKind::Authorization,

            Self::CalculationOverflow
            | Self::InsufficientFundsForPayout
            | Self::VaultNotEmptyAfterPayout
            | Self::InvalidServiceWallet
            | Self::WinnerAccountMismatch
            | Self::BumpSeedNotFound
            | Self::InsufficientBalance { .. } => ErrorKind::FundIntegrity,

            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

/// Errors in engine configuration, caught once at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid fee rate {numerator}/{denominator}")]
    InvalidFeeRate { numerator: u64, denominator: u64 },

    #[error("no service fee recipient configured")]
    MissingFeeRecipient,
}
