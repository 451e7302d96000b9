use palapa::prelude::*;

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

struct Table {
    creator: Identity,
    seed: &'static str,
    keys: RoomKeys,
    next_id: u64,
}

impl Table {
    fn new(creator: Identity, seed: &'static str) -> Result<Self, PalapaError> {
        Ok(Self {
            creator,
            seed,
            keys: RoomKeys::derive(&creator, seed)?,
            next_id: 1,
        })
    }

    fn request(&mut self, signer: Identity, instruction: Instruction) -> Request {
        let id = self.next_id;
        self.next_id += 1;
        Request {
            id,
            signer,
            room: self.keys.room,
            vault: self.keys.vault,
            instruction,
        }
    }

    fn create(&mut self, max_players: u16, entry_fee: Lamports) -> Request {
        let ix = Instruction::CreateRoom {
            room_seed: self.seed.into(),
            max_players,
            entry_fee,
        };
        self.request(self.creator, ix)
    }

    fn join(&mut self, player: Identity) -> Request {
        let ix = Instruction::JoinRoom {
            room_seed: self.seed.into(),
        };
        self.request(player, ix)
    }

    fn start(&mut self) -> Request {
        let ix = Instruction::StartRoom {
            room_seed: self.seed.into(),
        };
        self.request(self.creator, ix)
    }

    fn announce(&mut self, winner: Identity, recipient: Identity) -> Request {
        let ix = Instruction::AnnounceWinner {
            room_seed: self.seed.into(),
            winner,
            winner_account: winner,
            service_fee_recipient: recipient,
        };
        self.request(self.creator, ix)
    }
}

// ---------------------------------------------------------------------------
// Walkthrough: two players, 50 each, 5% fee
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), PalapaError> {
    palapa::logging::init();

    let recipient = Identity::new_unique();
    let host = PalapaHost::builder()
        .fee_recipient(recipient)
        .fee_rate(FeeRate::new(5, 100))
        .build()?;

    let creator = Identity::new_unique();
    let alice = Identity::new_unique();
    let bob = Identity::new_unique();
    host.fund(alice, 50).await?;
    host.fund(bob, 50).await?;

    let mut table = Table::new(creator, "r3")?;
    tracing::info!(room = %table.keys.room, vault = %table.keys.vault, "derived addresses");

    host.execute(table.create(2, 50)).await?;
    host.execute(table.join(alice)).await?;
    let receipt = host.execute(table.join(bob)).await?;
    tracing::info!(vault = receipt.vault_balance, "both players in");

    // Joining twice is refused and costs nothing.
    if let Err(e) = host.execute(table.join(alice)).await {
        tracing::info!(code = e.code(), name = e.name(), "second join refused");
    }

    host.execute(table.start()).await?;
    let receipt = host.execute(table.announce(alice, recipient)).await?;
    tracing::info!(status = %receipt.record.status, event = ?receipt.event, "room settled");

    let (a, b, fee) = (
        host.balance(&alice).await,
        host.balance(&bob).await,
        host.balance(&recipient).await,
    );
    tracing::info!(alice = a, bob = b, service = fee, "final balances");
    Ok(())
}
