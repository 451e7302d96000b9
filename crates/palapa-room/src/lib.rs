//! The Palapa escrow engine.
//!
//! A room collects an equal entry fee from each player into its own vault,
//! then pays the whole vault out at once: a service fee to the configured
//! recipient and the remainder to the declared winner. Rooms that nobody
//! joined can be cancelled instead.
//!
//! Each room runs as an isolated Tokio task (actor model), so operations
//! on one room are serialized while different rooms proceed independently.
//!
//! # Key types
//!
//! - [`RoomManager`] — opens rooms and routes requests to them
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomAccount`] — the pure state machine behind each actor
//! - [`RoomKeys`] — deterministic room and vault addresses
//! - [`Bank`] / [`Ledger`] — identity balances outside the vaults
//! - [`EngineConfig`] — fee recipient and fee rate

mod address;
mod config;
mod error;
mod ledger;
mod lifecycle;
mod manager;
mod payout;
mod room;

pub use address::{RecordKind, RoomKeys, create_address, derive_address, validate_seed};
pub use config::{
    Clock, EngineConfig, FeeRate, FixedClock, MAX_PLAYERS_LIMIT, MAX_SEED_LEN, MIN_PLAYERS,
    SystemClock,
};
pub use error::{ConfigError, EscrowError};
pub use ledger::{Bank, Ledger};
pub use lifecycle::{NewRoom, Payout, RoomAccount, Target};
pub use manager::RoomManager;
pub use payout::PayoutPlan;
pub use room::{RoomHandle, RoomView};
