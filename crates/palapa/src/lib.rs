//! # Palapa
//!
//! Multi-party escrow and prize-pool engine.
//!
//! Players join a room by depositing an equal entry fee into the room's
//! vault. The room's creator starts it, then declares a winner, and the
//! whole vault is paid out at once: a service fee to the configured
//! recipient and the remainder to the winner. Rooms that nobody joined can
//! be cancelled.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use palapa::prelude::*;
//!
//! # async fn run() -> Result<(), PalapaError> {
//! let host = PalapaHost::builder()
//!     .fee_recipient(Identity::new_unique())
//!     .build()?;
//!
//! let creator = Identity::new_unique();
//! let keys = RoomKeys::derive(&creator, "r1")?;
//! let receipt = host
//!     .execute(Request {
//!         id: 1,
//!         signer: creator,
//!         room: keys.room,
//!         vault: keys.vault,
//!         instruction: Instruction::CreateRoom {
//!             room_seed: "r1".into(),
//!             max_players: 4,
//!             entry_fee: 100,
//!         },
//!     })
//!     .await?;
//! assert_eq!(receipt.record.status, RoomStatus::OpenForJoining);
//! # Ok(())
//! # }
//! ```

mod error;
mod handler;
mod host;
pub mod logging;

pub use error::PalapaError;
pub use host::{PalapaHost, PalapaHostBuilder};

/// Everything needed to build requests and run a host.
pub mod prelude {
    pub use crate::{PalapaError, PalapaHost, PalapaHostBuilder};
    pub use palapa_protocol::{
        Address, Codec, ErrorKind, Identity, Instruction, JsonCodec, Lamports, Receipt, Request,
        Response, RoomEvent, RoomRecord, RoomStatus, VaultRecord,
    };
    pub use palapa_room::{
        Bank, Clock, EngineConfig, EscrowError, FeeRate, FixedClock, Ledger, RoomKeys, RoomView,
        SystemClock,
    };
}
