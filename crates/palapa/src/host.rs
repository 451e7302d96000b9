//! `PalapaHost` builder and request dispatch.
//!
//! The host ties the layers together: bytes → protocol → room actor →
//! receipt → bytes. It holds no transport; whatever carries requests
//! (an RPC endpoint, a queue consumer, a test) hands it bytes or decoded
//! [`Request`]s.

use std::sync::Arc;

use palapa_protocol::{
    Address, Codec, Identity, Instruction, JsonCodec, Lamports, Receipt, Request, Response,
};
use palapa_room::{
    Bank, Clock, ConfigError, EngineConfig, EscrowError, FeeRate, Ledger, RoomManager, RoomView,
    SystemClock,
};
use tokio::sync::Mutex;

use crate::PalapaError;
use crate::handler::{rejected, to_response};

/// Builder for configuring a [`PalapaHost`].
///
/// # Example
///
/// ```rust
/// use palapa::prelude::*;
///
/// let host = PalapaHost::builder()
///     .fee_recipient(Identity::new_unique())
///     .fee_rate(FeeRate::new(5, 100))
///     .build()?;
/// # let _ = host;
/// # Ok::<(), PalapaError>(())
/// ```
pub struct PalapaHostBuilder {
    fee_recipient: Option<Identity>,
    fee_rate: FeeRate,
    clock: Arc<dyn Clock>,
}

impl PalapaHostBuilder {
    /// Creates a builder with the default fee rate and the system clock.
    pub fn new() -> Self {
        Self {
            fee_recipient: None,
            fee_rate: FeeRate::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the only identity allowed to receive service fees. Required.
    pub fn fee_recipient(mut self, recipient: Identity) -> Self {
        self.fee_recipient = Some(recipient);
        self
    }

    /// Sets the service fee rate.
    pub fn fee_rate(mut self, rate: FeeRate) -> Self {
        self.fee_rate = rate;
        self
    }

    /// Sets the clock used for room timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Uses an already-assembled configuration.
    pub fn config(self, config: EngineConfig) -> Self {
        self.fee_recipient(config.fee_recipient)
            .fee_rate(config.fee_rate)
    }

    /// Builds a host with an in-memory [`Ledger`] and [`JsonCodec`].
    pub fn build(self) -> Result<PalapaHost, PalapaError> {
        self.build_with(Ledger::new(), JsonCodec)
    }

    /// Builds a host over a caller-provided bank and codec.
    pub fn build_with<B: Bank, C: Codec>(
        self,
        bank: B,
        codec: C,
    ) -> Result<PalapaHost<B, C>, PalapaError> {
        let fee_recipient = self.fee_recipient.ok_or(ConfigError::MissingFeeRecipient)?;
        let config = EngineConfig {
            fee_recipient,
            fee_rate: self.fee_rate,
        };
        let rooms = RoomManager::new(config, bank, self.clock)?;

        tracing::info!(
            %fee_recipient,
            fee_numerator = self.fee_rate.numerator,
            fee_denominator = self.fee_rate.denominator,
            "palapa host ready"
        );

        Ok(PalapaHost {
            bank: rooms.bank(),
            rooms: Mutex::new(rooms),
            codec,
        })
    }
}

impl Default for PalapaHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The escrow engine behind a byte-level entry point.
///
/// Safe to share across tasks (`Arc<PalapaHost>`). The manager lock is
/// held only to open a room or to look up its handle; the operation itself
/// runs on the room's actor, so different rooms never wait on each other.
pub struct PalapaHost<B: Bank = Ledger, C: Codec = JsonCodec> {
    rooms: Mutex<RoomManager<B>>,
    bank: Arc<Mutex<B>>,
    codec: C,
}

impl PalapaHost {
    /// Creates a new builder.
    pub fn builder() -> PalapaHostBuilder {
        PalapaHostBuilder::new()
    }
}

impl<B: Bank, C: Codec> PalapaHost<B, C> {
    /// Decodes a [`Request`], executes it, and encodes the [`Response`].
    ///
    /// Never fails: malformed input yields `Response::Rejected`.
    pub async fn handle_bytes(&self, data: &[u8]) -> Vec<u8> {
        let response = match self.codec.decode::<Request>(data) {
            Ok(request) => {
                let id = request.id;
                to_response(id, self.execute(request).await)
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to decode request");
                rejected(&e)
            }
        };
        self.encode_response(&response)
    }

    fn encode_response(&self, response: &Response) -> Vec<u8> {
        match self.codec.encode(response) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode response");
                self.codec.encode(&rejected(&e)).unwrap_or_default()
            }
        }
    }

    /// Executes one decoded request.
    pub async fn execute(&self, request: Request) -> Result<Receipt, EscrowError> {
        tracing::debug!(
            id = request.id,
            op = request.instruction.name(),
            signer = %request.signer,
            room = %request.room,
            "executing request"
        );

        if matches!(request.instruction, Instruction::CreateRoom { .. }) {
            return self.rooms.lock().await.execute(request).await;
        }

        let handle = self.rooms.lock().await.handle(&request.room)?;
        handle.execute(request).await
    }

    /// Reads one room and its vault.
    pub async fn room(&self, address: &Address) -> Result<RoomView, EscrowError> {
        let handle = self.rooms.lock().await.handle(address)?;
        handle.snapshot().await
    }

    /// Lists every room address the host knows about.
    pub async fn room_addresses(&self) -> Vec<Address> {
        self.rooms.lock().await.room_addresses()
    }

    /// Current balance of an identity.
    pub async fn balance(&self, owner: &Identity) -> Lamports {
        self.bank.lock().await.balance(owner)
    }

    /// The active configuration.
    pub async fn config(&self) -> EngineConfig {
        self.rooms.lock().await.config().clone()
    }
}

impl<C: Codec> PalapaHost<Ledger, C> {
    /// Credits an identity in the in-memory ledger.
    pub async fn fund(&self, owner: Identity, amount: Lamports) -> Result<(), EscrowError> {
        self.bank.lock().await.fund(owner, amount)
    }
}
