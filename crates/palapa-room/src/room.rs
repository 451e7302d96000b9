//! Room actor: an isolated Tokio task that owns one room and its vault.
//!
//! Each room runs in its own task and is reached only through an mpsc
//! channel, so operations on the same room are applied one at a time in
//! arrival order. Rooms never wait on each other; the only shared state is
//! the [`Bank`], locked for the duration of a single debit or credit.

use std::sync::Arc;

use palapa_protocol::{Address, Instruction, Receipt, Request, RoomRecord, VaultRecord};
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::lifecycle::{Payout, RoomAccount, Target};
use crate::{Bank, Clock, EngineConfig, EscrowError};

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Apply one instruction.
    Execute {
        request: Request,
        reply: oneshot::Sender<Result<Receipt, EscrowError>>,
    },

    /// Read the current room and vault.
    GetState { reply: oneshot::Sender<RoomView> },
}

/// A consistent snapshot of one room and its vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    pub address: Address,
    pub record: RoomRecord,
    pub vault: VaultRecord,
}

/// Handle to a running room actor.
///
/// Cheap to clone. The `RoomManager` holds one per room; callers clone it
/// out so they can await without holding the manager.
#[derive(Clone)]
pub struct RoomHandle {
    address: Address,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sends an instruction and waits for its outcome.
    pub async fn execute(&self, request: Request) -> Result<Receipt, EscrowError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Execute {
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EscrowError::Unavailable(self.address))?;
        reply_rx
            .await
            .map_err(|_| EscrowError::Unavailable(self.address))?
    }

    /// Requests a snapshot of the room.
    pub async fn snapshot(&self) -> Result<RoomView, EscrowError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetState { reply: reply_tx })
            .await
            .map_err(|_| EscrowError::Unavailable(self.address))?;
        reply_rx
            .await
            .map_err(|_| EscrowError::Unavailable(self.address))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor<B: Bank> {
    account: RoomAccount,
    bank: Arc<Mutex<B>>,
    config: Arc<EngineConfig>,
    clock: Arc<dyn Clock>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<B: Bank> RoomActor<B> {
    /// Runs until every handle is dropped. Rooms are never torn down while
    /// the engine is alive, settled or not.
    async fn run(mut self) {
        tracing::info!(room = %self.account.address, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Execute { request, reply } => {
                    let result = self.handle_execute(request).await;
                    let _ = reply.send(result);
                }
                RoomCommand::GetState { reply } => {
                    let _ = reply.send(self.view());
                }
            }
        }

        tracing::info!(room = %self.account.address, "room actor stopped");
    }

    async fn handle_execute(&mut self, request: Request) -> Result<Receipt, EscrowError> {
        let op = request.instruction.name();
        let result = self.apply(&request).await;

        match &result {
            Ok(_) => {
                if !self.account.invariants_hold() {
                    tracing::error!(
                        room = %self.account.address,
                        op,
                        status = %self.account.record.status,
                        vault = self.account.vault.balance,
                        "room invariants violated after commit"
                    );
                }
            }
            Err(e) => {
                tracing::debug!(
                    room = %self.account.address,
                    op,
                    signer = %request.signer,
                    error = %e,
                    kind = ?e.kind(),
                    "operation rejected"
                );
            }
        }
        result
    }

    async fn apply(&mut self, request: &Request) -> Result<Receipt, EscrowError> {
        let target = Target {
            seed: request.instruction.room_seed(),
            room: request.room,
            vault: request.vault,
        };
        let signer = request.signer;

        let event = match &request.instruction {
            Instruction::CreateRoom { .. } => {
                return Err(EscrowError::RoomAlreadyExists(self.account.address));
            }
            Instruction::JoinRoom { .. } => {
                let mut bank = self.bank.lock().await;
                self.account.join(&mut *bank, signer, &target)?
            }
            Instruction::StartRoom { .. } => self.account.start(&signer, &target)?,
            Instruction::AnnounceWinner {
                winner,
                winner_account,
                service_fee_recipient,
                ..
            } => {
                let payout = Payout {
                    winner: *winner,
                    winner_account: *winner_account,
                    service_fee_recipient: *service_fee_recipient,
                };
                let now = self.clock.now();
                let mut bank = self.bank.lock().await;
                self.account
                    .announce_winner(&mut *bank, &self.config, &signer, &target, payout, now)?
            }
            Instruction::CancelRoom { .. } => {
                self.account.cancel(&signer, &target, self.clock.now())?
            }
        };

        Ok(self.account.receipt(event))
    }

    fn view(&self) -> RoomView {
        RoomView {
            address: self.account.address,
            record: self.account.record.clone(),
            vault: self.account.vault.clone(),
        }
    }
}

/// Spawns a room actor around an already-opened account.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room<B: Bank>(
    account: RoomAccount,
    bank: Arc<Mutex<B>>,
    config: Arc<EngineConfig>,
    clock: Arc<dyn Clock>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let address = account.address;

    let actor = RoomActor {
        account,
        bank,
        config,
        clock,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        address,
        sender: tx,
    }
}
