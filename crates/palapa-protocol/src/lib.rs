//! Wire vocabulary for Palapa.
//!
//! This crate defines what the engine and its callers exchange:
//!
//! - **Types** ([`Identity`], [`Address`], [`Lamports`]) — who and how much.
//! - **Records** ([`RoomRecord`], [`VaultRecord`], [`RoomStatus`]) — the
//!   authoritative state of a room and its vault.
//! - **Messages** ([`Request`], [`Instruction`], [`Response`],
//!   [`Receipt`]) — what a caller asks for and what it gets back.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become bytes.
//!
//! It knows nothing about the rules of a room; those live in
//! `palapa-room`.

mod codec;
mod error;
mod message;
mod records;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{ErrorKind, Instruction, Receipt, Request, Response, RoomEvent};
pub use records::{RoomRecord, RoomStatus, VaultRecord};
pub use types::{Address, Identity, KEY_LEN, Lamports, UnixTimestamp};
