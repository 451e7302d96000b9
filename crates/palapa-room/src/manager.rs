//! Room manager: opens rooms, tracks their actors, and routes requests.

use std::collections::HashMap;
use std::sync::Arc;

use palapa_protocol::{Address, Instruction, Receipt, Request};
use tokio::sync::Mutex;

use crate::lifecycle::{NewRoom, RoomAccount};
use crate::room::spawn_room;
use crate::{Bank, Clock, ConfigError, EngineConfig, EscrowError, RoomHandle, RoomView};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Owns every room, keyed by room address.
///
/// Creation goes through the manager so that address uniqueness is checked
/// in one place. Everything after creation runs on the room's own actor.
/// Rooms are only ever added: a settled or cancelled room keeps its record
/// and its address stays taken.
pub struct RoomManager<B: Bank> {
    rooms: HashMap<Address, RoomHandle>,
    bank: Arc<Mutex<B>>,
    config: Arc<EngineConfig>,
    clock: Arc<dyn Clock>,
}

impl<B: Bank> RoomManager<B> {
    /// Creates an empty manager. The configuration is validated here, once.
    pub fn new(config: EngineConfig, bank: B, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rooms: HashMap::new(),
            bank: Arc::new(Mutex::new(bank)),
            config: Arc::new(config),
            clock,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared balance store.
    pub fn bank(&self) -> Arc<Mutex<B>> {
        Arc::clone(&self.bank)
    }

    /// Opens a room at the supplied addresses and spawns its actor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn create_room(
        &mut self,
        params: NewRoom,
        room: Address,
        vault: Address,
    ) -> Result<Receipt, EscrowError> {
        let creator = params.creator;
        let account = RoomAccount::open(params, &room, &vault, self.clock.now())?;
        if self.rooms.contains_key(&account.address) {
            return Err(EscrowError::RoomAlreadyExists(account.address));
        }

        let receipt = account.receipt(account.created_event());
        let address = account.address;
        tracing::info!(
            room = %address,
            %creator,
            seed = %account.record.room_seed,
            max_players = account.record.max_players,
            entry_fee = account.record.entry_fee,
            "room created"
        );

        let handle = spawn_room(
            account,
            Arc::clone(&self.bank),
            Arc::clone(&self.config),
            Arc::clone(&self.clock),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(address, handle);
        Ok(receipt)
    }

    /// Returns a clone of the handle for `address`.
    pub fn handle(&self, address: &Address) -> Result<RoomHandle, EscrowError> {
        self.rooms
            .get(address)
            .cloned()
            .ok_or(EscrowError::RoomNotFound(*address))
    }

    /// Runs one request to completion.
    ///
    /// `createRoom` is handled here; everything else is forwarded to the
    /// actor of `request.room`.
    pub async fn execute(&mut self, request: Request) -> Result<Receipt, EscrowError> {
        match request.instruction {
            Instruction::CreateRoom {
                room_seed,
                max_players,
                entry_fee,
            } => {
                let params = NewRoom {
                    creator: request.signer,
                    seed: room_seed,
                    max_players,
                    entry_fee,
                };
                self.create_room(params, request.room, request.vault)
            }
            _ => self.handle(&request.room)?.execute(request).await,
        }
    }

    /// Returns a snapshot of a specific room.
    pub async fn get_room(&self, address: &Address) -> Result<RoomView, EscrowError> {
        self.handle(address)?.snapshot().await
    }

    /// Returns the number of rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists every room address, in no particular order.
    pub fn room_addresses(&self) -> Vec<Address> {
        self.rooms.keys().copied().collect()
    }
}
