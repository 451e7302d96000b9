//! Room lifecycle: the state machine and the fund movements tied to it.
//!
//! Every operation here follows the same shape: check authorization,
//! re-derive the addresses, check the state, stage the change on copies,
//! and only then commit. A returned error always means nothing changed,
//! neither in the room nor in the bank.

use palapa_protocol::{
    Address, Identity, Lamports, Receipt, RoomEvent, RoomRecord, RoomStatus, UnixTimestamp,
    VaultRecord,
};

use crate::address::{RoomKeys, validate_seed};
use crate::payout::{PayoutPlan, deposit_to_vault, withdraw_from_vault};
use crate::{Bank, EngineConfig, EscrowError, MAX_PLAYERS_LIMIT, MIN_PLAYERS};

/// The addresses and seed a request claims to act on.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub seed: &'a str,
    pub room: Address,
    pub vault: Address,
}

/// Parameters of `createRoom`.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub creator: Identity,
    pub seed: String,
    pub max_players: u16,
    pub entry_fee: Lamports,
}

impl NewRoom {
    /// Input validation, before anything is derived or allocated.
    pub fn validate(&self) -> Result<(), EscrowError> {
        validate_seed(&self.seed)?;
        if self.max_players < MIN_PLAYERS {
            return Err(EscrowError::InvalidMaxPlayers);
        }
        if self.max_players > MAX_PLAYERS_LIMIT {
            return Err(EscrowError::MaxPlayersExceedsLimit);
        }
        if self.entry_fee == 0 {
            return Err(EscrowError::InvalidEntryFee);
        }
        Ok(())
    }
}

/// Who gets paid when a winner is announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub winner: Identity,
    /// Must equal `winner`.
    pub winner_account: Identity,
    /// Must equal the configured fee recipient.
    pub service_fee_recipient: Identity,
}

/// A room record together with its vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAccount {
    pub address: Address,
    pub record: RoomRecord,
    pub vault: VaultRecord,
}

impl RoomAccount {
    /// Allocates a room in `OpenForJoining` and an empty vault.
    ///
    /// Fails if the input is invalid or the supplied addresses are not the
    /// ones derived from `(creator, seed)`.
    pub fn open(
        params: NewRoom,
        room: &Address,
        vault: &Address,
        now: UnixTimestamp,
    ) -> Result<Self, EscrowError> {
        params.validate()?;
        let keys = RoomKeys::derive(&params.creator, &params.seed)?;
        keys.verify(room, vault)?;

        Ok(Self {
            address: keys.room,
            record: RoomRecord {
                creator: params.creator,
                room_seed: params.seed,
                bump: keys.room_bump,
                vault_bump: keys.vault_bump,
                status: RoomStatus::OpenForJoining,
                winner: None,
                max_players: params.max_players,
                entry_fee: params.entry_fee,
                players: Vec::with_capacity(usize::from(params.max_players)),
                creation_timestamp: now,
                end_timestamp: None,
            },
            vault: VaultRecord {
                address: keys.vault,
                bump: keys.vault_bump,
                balance: 0,
                closed: false,
            },
        })
    }

    /// The event describing a freshly opened room.
    pub fn created_event(&self) -> RoomEvent {
        RoomEvent::RoomCreated {
            creator: self.record.creator,
            max_players: self.record.max_players,
            entry_fee: self.record.entry_fee,
        }
    }

    /// Recomputes this room's addresses from the supplied seed and the
    /// stored bumps, and compares them with what the caller sent.
    pub fn verify_target(&self, target: &Target<'_>) -> Result<(), EscrowError> {
        let keys = RoomKeys::from_bumps(
            &self.record.creator,
            target.seed,
            self.record.bump,
            self.record.vault_bump,
        )?;
        keys.verify(&target.room, &target.vault)
    }

    fn authorize_creator(&self, signer: &Identity) -> Result<(), EscrowError> {
        if *signer != self.record.creator {
            return Err(EscrowError::Unauthorized);
        }
        Ok(())
    }

    /// Adds `player` and moves the entry fee from their balance into the
    /// vault, as one unit.
    pub fn join<B: Bank>(
        &mut self,
        bank: &mut B,
        player: Identity,
        target: &Target<'_>,
    ) -> Result<RoomEvent, EscrowError> {
        self.verify_target(target)?;

        if !self.record.status.is_open() || self.vault.closed {
            return Err(EscrowError::RoomNotJoinable);
        }
        if self.record.is_full() {
            return Err(EscrowError::RoomFull);
        }
        if self.record.contains_player(&player) {
            return Err(EscrowError::PlayerAlreadyJoined);
        }

        let fee = self.record.entry_fee;
        let mut vault = self.vault.clone();
        deposit_to_vault(&mut vault, fee)?;

        // Last fallible step. Past this point the join commits.
        bank.withdraw(&player, fee)?;

        self.vault = vault;
        self.record.players.push(player);

        tracing::info!(
            room = %self.address,
            %player,
            players = self.record.players.len(),
            vault = self.vault.balance,
            "player joined"
        );

        Ok(RoomEvent::PlayerJoined {
            player,
            amount: fee,
            player_count: self.record.players.len(),
        })
    }

    /// Moves an open room to `InProgress`. Creator only.
    pub fn start(
        &mut self,
        signer: &Identity,
        target: &Target<'_>,
    ) -> Result<RoomEvent, EscrowError> {
        self.authorize_creator(signer)?;
        self.verify_target(target)?;

        if !self.record.status.can_transition_to(RoomStatus::InProgress) {
            return Err(EscrowError::RoomNotOpenForStarting);
        }

        self.record.status = RoomStatus::InProgress;

        tracing::info!(
            room = %self.address,
            players = self.record.players.len(),
            "room started"
        );

        Ok(RoomEvent::RoomStarted {
            player_count: self.record.players.len(),
        })
    }

    /// Declares the winner and drains the vault: the service fee to the
    /// configured recipient, the rest to the winner. Creator only.
    pub fn announce_winner<B: Bank>(
        &mut self,
        bank: &mut B,
        config: &EngineConfig,
        signer: &Identity,
        target: &Target<'_>,
        payout: Payout,
        now: UnixTimestamp,
    ) -> Result<RoomEvent, EscrowError> {
        let Payout {
            winner,
            winner_account,
            service_fee_recipient,
        } = payout;
        self.authorize_creator(signer)?;
        self.verify_target(target)?;

        if self.record.status != RoomStatus::InProgress {
            return Err(EscrowError::RoomNotInProgress);
        }
        if !self.record.contains_player(&winner) {
            return Err(EscrowError::WinnerNotInRoom);
        }
        if service_fee_recipient != config.fee_recipient {
            return Err(EscrowError::InvalidServiceWallet);
        }
        if winner_account != winner {
            return Err(EscrowError::WinnerAccountMismatch);
        }

        let mut vault = self.vault.clone();
        let plan = PayoutPlan::compute(vault.balance, config.fee_rate)?;
        withdraw_from_vault(&mut vault, plan.service_fee)?;
        withdraw_from_vault(&mut vault, plan.prize_share)?;

        if vault.balance != 0 {
            tracing::error!(
                room = %self.address,
                left = vault.balance,
                pool = plan.pool,
                "vault not empty after payout"
            );
            return Err(EscrowError::VaultNotEmptyAfterPayout);
        }

        // Last fallible step. Past this point the payout commits.
        bank.deposit_all(&[
            (service_fee_recipient, plan.service_fee),
            (winner_account, plan.prize_share),
        ])?;

        vault.closed = true;
        self.vault = vault;
        self.record.status = RoomStatus::Finished;
        self.record.winner = Some(winner);
        self.record.end_timestamp = Some(now);

        tracing::info!(
            room = %self.address,
            %winner,
            pool = plan.pool,
            prize = plan.prize_share,
            fee = plan.service_fee,
            "winner announced"
        );

        Ok(RoomEvent::WinnerAnnounced {
            winner,
            pool: plan.pool,
            prize_share: plan.prize_share,
            service_fee: plan.service_fee,
            service_fee_recipient,
        })
    }

    /// Cancels a room nobody joined and closes its vault. Creator only.
    pub fn cancel(
        &mut self,
        signer: &Identity,
        target: &Target<'_>,
        now: UnixTimestamp,
    ) -> Result<RoomEvent, EscrowError> {
        self.authorize_creator(signer)?;
        self.verify_target(target)?;

        if !self.record.players.is_empty() {
            return Err(EscrowError::CannotCancelRoomPlayersJoined);
        }
        if !self.record.status.can_transition_to(RoomStatus::Cancelled) {
            return Err(EscrowError::CannotCancelRoomState);
        }
        // No players means no deposits; anything else is an engine defect.
        if self.vault.balance != 0 {
            tracing::error!(
                room = %self.address,
                left = self.vault.balance,
                "vault not empty on cancel"
            );
            return Err(EscrowError::VaultNotEmptyAfterPayout);
        }

        self.vault.closed = true;
        self.record.status = RoomStatus::Cancelled;
        self.record.end_timestamp = Some(now);

        tracing::info!(room = %self.address, "room cancelled");

        Ok(RoomEvent::RoomCancelled)
    }

    /// Packages the current state with an event.
    pub fn receipt(&self, event: RoomEvent) -> Receipt {
        Receipt {
            room: self.address,
            vault: self.vault.address,
            record: self.record.clone(),
            vault_balance: self.vault.balance,
            event,
        }
    }

    /// Checks the record-level invariants after a committed operation.
    pub fn invariants_hold(&self) -> bool {
        let record = &self.record;
        let within_capacity = record.players.len() <= usize::from(record.max_players);
        let winner_iff_finished = record.winner.is_some() == (record.status == RoomStatus::Finished);
        let vault_matches = if record.status.is_terminal() {
            self.vault.balance == 0 && self.vault.closed
        } else {
            record.expected_pool() == Some(self.vault.balance)
        };
        within_capacity && winner_iff_finished && vault_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeeRate, Ledger};

    const NOW: UnixTimestamp = 1_700_000_000;

    struct Fixture {
        creator: Identity,
        recipient: Identity,
        seed: String,
        config: EngineConfig,
        bank: Ledger,
        keys: RoomKeys,
        account: RoomAccount,
    }

    fn target<'a>(seed: &'a str, keys: &RoomKeys) -> Target<'a> {
        Target {
            seed,
            room: keys.room,
            vault: keys.vault,
        }
    }

    fn fixture(seed: &str, max_players: u16, entry_fee: Lamports) -> Fixture {
        let creator = Identity::new_unique();
        let keys = RoomKeys::derive(&creator, seed).unwrap();
        let account = RoomAccount::open(
            NewRoom {
                creator,
                seed: seed.into(),
                max_players,
                entry_fee,
            },
            &keys.room,
            &keys.vault,
            NOW,
        )
        .unwrap();
        let recipient = Identity::new_unique();
        Fixture {
            creator,
            recipient,
            seed: seed.into(),
            config: EngineConfig {
                fee_recipient: recipient,
                fee_rate: FeeRate::new(5, 100),
            },
            bank: Ledger::new(),
            keys,
            account,
        }
    }

    impl Fixture {
        fn funded_player(&mut self, amount: Lamports) -> Identity {
            let player = Identity::new_unique();
            self.bank.fund(player, amount).unwrap();
            player
        }

        fn join(&mut self, player: Identity) -> Result<RoomEvent, EscrowError> {
            let t = target(&self.seed, &self.keys);
            self.account.join(&mut self.bank, player, &t)
        }

        fn start(&mut self) -> Result<RoomEvent, EscrowError> {
            let t = target(&self.seed, &self.keys);
            self.account.start(&self.creator, &t)
        }

        fn cancel(&mut self) -> Result<RoomEvent, EscrowError> {
            let t = target(&self.seed, &self.keys);
            self.account.cancel(&self.creator, &t, NOW + 60)
        }

        fn announce(
            &mut self,
            signer: Identity,
            winner: Identity,
            winner_account: Identity,
            fee_to: Identity,
        ) -> Result<RoomEvent, EscrowError> {
            let t = target(&self.seed, &self.keys);
            let payout = Payout {
                winner,
                winner_account,
                service_fee_recipient: fee_to,
            };
            self.account
                .announce_winner(&mut self.bank, &self.config, &signer, &t, payout, NOW + 5)
        }

        /// Two funded players joined, room started.
        fn in_progress_with_two(&mut self) -> (Identity, Identity) {
            let fee = self.account.record.entry_fee;
            let p1 = self.funded_player(fee);
            let p2 = self.funded_player(fee);
            self.join(p1).unwrap();
            self.join(p2).unwrap();
            self.start().unwrap();
            (p1, p2)
        }
    }

    fn open_with(max_players: u16, entry_fee: Lamports, seed: &str) -> Result<RoomAccount, EscrowError> {
        let creator = Identity::new_unique();
        let keys = RoomKeys::derive(&creator, "ok").unwrap();
        RoomAccount::open(
            NewRoom {
                creator,
                seed: seed.into(),
                max_players,
                entry_fee,
            },
            &keys.room,
            &keys.vault,
            NOW,
        )
    }

    // =====================================================================
    // open()
    // =====================================================================

    #[test]
    fn test_open_starts_open_for_joining_with_empty_vault() {
        let f = fixture("r1", 4, 100);
        assert_eq!(f.account.record.status, RoomStatus::OpenForJoining);
        assert_eq!(f.account.vault.balance, 0);
        assert_eq!(f.account.record.creation_timestamp, NOW);
        assert!(f.account.record.players.is_empty());
        assert!(f.account.invariants_hold());
    }

    #[test]
    fn test_open_validation_errors() {
        assert_eq!(open_with(1, 100, "ok"), Err(EscrowError::InvalidMaxPlayers));
        assert_eq!(open_with(0, 100, "ok"), Err(EscrowError::InvalidMaxPlayers));
        assert_eq!(
            open_with(MAX_PLAYERS_LIMIT + 1, 100, "ok"),
            Err(EscrowError::MaxPlayersExceedsLimit)
        );
        assert_eq!(open_with(4, 0, "ok"), Err(EscrowError::InvalidEntryFee));
        assert_eq!(open_with(4, 100, ""), Err(EscrowError::InvalidRoomSeed));
    }

    #[test]
    fn test_open_with_mismatched_addresses_is_invalid_creator() {
        // Keys derived for "ok" but the seed is "other".
        assert_eq!(open_with(4, 100, "other"), Err(EscrowError::InvalidCreator));
    }

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_moves_entry_fee_into_vault() {
        let mut f = fixture("r1", 4, 100);
        let p1 = f.funded_player(250);

        let event = f.join(p1).unwrap();

        assert_eq!(
            event,
            RoomEvent::PlayerJoined {
                player: p1,
                amount: 100,
                player_count: 1
            }
        );
        assert_eq!(f.account.record.players, vec![p1]);
        assert_eq!(f.account.vault.balance, 100);
        assert_eq!(f.bank.balance(&p1), 150);
        assert!(f.account.invariants_hold());
    }

    #[test]
    fn test_join_twice_returns_already_joined_and_charges_once() {
        let mut f = fixture("r1", 4, 100);
        let p1 = f.funded_player(500);
        f.join(p1).unwrap();

        assert_eq!(f.join(p1), Err(EscrowError::PlayerAlreadyJoined));
        assert_eq!(f.account.record.players.len(), 1);
        assert_eq!(f.bank.balance(&p1), 400);
    }

    #[test]
    fn test_join_insufficient_balance_changes_nothing() {
        let mut f = fixture("r1", 4, 100);
        let poor = f.funded_player(99);
        let before = f.account.clone();

        let err = f.join(poor).unwrap_err();

        assert!(matches!(err, EscrowError::InsufficientBalance { .. }));
        assert_eq!(f.account, before);
        assert_eq!(f.bank.balance(&poor), 99);
    }

    #[test]
    fn test_join_full_room_returns_room_full() {
        let mut f = fixture("r1", 2, 10);
        for _ in 0..2 {
            let p = f.funded_player(10);
            f.join(p).unwrap();
        }
        let late = f.funded_player(10);
        assert_eq!(f.join(late), Err(EscrowError::RoomFull));
        assert_eq!(f.bank.balance(&late), 10);
    }

    #[test]
    fn test_join_created_status_is_joinable() {
        let mut f = fixture("r1", 2, 10);
        f.account.record.status = RoomStatus::Created;
        let p = f.funded_player(10);
        assert!(f.join(p).is_ok());
    }

    #[test]
    fn test_join_after_start_is_not_joinable() {
        let mut f = fixture("r1", 4, 10);
        f.start().unwrap();
        let p = f.funded_player(10);
        assert_eq!(f.join(p), Err(EscrowError::RoomNotJoinable));
        assert_eq!(f.bank.balance(&p), 10);
    }

    #[test]
    fn test_join_with_wrong_seed_is_rejected() {
        let mut f = fixture("r1", 4, 10);
        let p = f.funded_player(10);
        let t = target("r2", &f.keys);
        assert_eq!(
            f.account.join(&mut f.bank, p, &t),
            Err(EscrowError::InvalidCreator)
        );
        assert!(f.account.record.players.is_empty());
    }

    // =====================================================================
    // start() / cancel()
    // =====================================================================

    #[test]
    fn test_start_by_non_creator_is_unauthorized() {
        let mut f = fixture("r1", 4, 10);
        let t = target(&f.seed, &f.keys);
        let stranger = Identity::new_unique();
        assert_eq!(f.account.start(&stranger, &t), Err(EscrowError::Unauthorized));
        assert_eq!(f.account.record.status, RoomStatus::OpenForJoining);
    }

    #[test]
    fn test_start_twice_is_not_open_for_starting() {
        let mut f = fixture("r1", 4, 10);
        f.start().unwrap();
        assert_eq!(f.start(), Err(EscrowError::RoomNotOpenForStarting));
    }

    #[test]
    fn test_start_with_no_players_is_allowed() {
        let mut f = fixture("r1", 4, 10);
        assert_eq!(f.start(), Ok(RoomEvent::RoomStarted { player_count: 0 }));
    }

    #[test]
    fn test_cancel_empty_room_closes_vault() {
        let mut f = fixture("r2", 2, 50);

        let event = f.cancel().unwrap();

        assert_eq!(event, RoomEvent::RoomCancelled);
        assert_eq!(f.account.record.status, RoomStatus::Cancelled);
        assert_eq!(f.account.record.end_timestamp, Some(NOW + 60));
        assert!(f.account.vault.closed);
        assert!(f.account.invariants_hold());
    }

    #[test]
    fn test_cancel_with_players_fails_regardless_of_status() {
        let mut f = fixture("r1", 4, 10);
        let p = f.funded_player(10);
        f.join(p).unwrap();

        assert_eq!(f.cancel(), Err(EscrowError::CannotCancelRoomPlayersJoined));
        f.start().unwrap();
        assert_eq!(f.cancel(), Err(EscrowError::CannotCancelRoomPlayersJoined));
    }

    #[test]
    fn test_cancel_started_empty_room_is_wrong_state() {
        let mut f = fixture("r1", 4, 10);
        f.start().unwrap();
        assert_eq!(f.cancel(), Err(EscrowError::CannotCancelRoomState));
    }

    #[test]
    fn test_cancel_by_non_creator_is_unauthorized() {
        let mut f = fixture("r1", 4, 10);
        let t = target(&f.seed, &f.keys);
        let stranger = Identity::new_unique();
        assert_eq!(
            f.account.cancel(&stranger, &t, NOW),
            Err(EscrowError::Unauthorized)
        );
    }

    // =====================================================================
    // announce_winner()
    // =====================================================================

    #[test]
    fn test_announce_winner_splits_vault() {
        let mut f = fixture("r3", 2, 50);
        let (p1, _) = f.in_progress_with_two();
        let (creator, recipient) = (f.creator, f.recipient);

        let event = f.announce(creator, p1, p1, recipient).unwrap();

        assert_eq!(
            event,
            RoomEvent::WinnerAnnounced {
                winner: p1,
                pool: 100,
                prize_share: 95,
                service_fee: 5,
                service_fee_recipient: recipient,
            }
        );
        assert_eq!(f.bank.balance(&p1), 95);
        assert_eq!(f.bank.balance(&recipient), 5);
        assert_eq!(f.account.vault.balance, 0);
        assert_eq!(f.account.record.status, RoomStatus::Finished);
        assert_eq!(f.account.record.winner, Some(p1));
        assert_eq!(f.account.record.end_timestamp, Some(NOW + 5));
        assert!(f.account.invariants_hold());
    }

    #[test]
    fn test_announce_winner_rejections_leave_state_unchanged() {
        let mut f = fixture("r3", 2, 50);
        let (p1, _) = f.in_progress_with_two();
        let outsider = Identity::new_unique();
        let before = f.account.clone();
        let (creator, recipient) = (f.creator, f.recipient);

        let cases = [
            (outsider, p1, p1, recipient, EscrowError::Unauthorized),
            (creator, outsider, outsider, recipient, EscrowError::WinnerNotInRoom),
            (creator, p1, p1, outsider, EscrowError::InvalidServiceWallet),
            (creator, p1, outsider, recipient, EscrowError::WinnerAccountMismatch),
        ];
        for (signer, winner, account, fee_to, expected) in cases {
            assert_eq!(f.announce(signer, winner, account, fee_to), Err(expected));
            assert_eq!(f.account, before);
        }
        assert_eq!(f.bank.balance(&p1), 0);
        assert_eq!(f.bank.balance(&recipient), 0);
    }

    #[test]
    fn test_announce_winner_before_start_is_not_in_progress() {
        let mut f = fixture("r1", 2, 10);
        let p = f.funded_player(10);
        f.join(p).unwrap();
        let (creator, recipient) = (f.creator, f.recipient);
        assert_eq!(
            f.announce(creator, p, p, recipient),
            Err(EscrowError::RoomNotInProgress)
        );
    }

    #[test]
    fn test_announce_winner_recipient_overflow_changes_nothing() {
        let mut f = fixture("r3", 2, 50);
        let (p1, _) = f.in_progress_with_two();
        let (creator, recipient) = (f.creator, f.recipient);
        f.bank.fund(recipient, u64::MAX).unwrap();
        let before = f.account.clone();

        let result = f.announce(creator, p1, p1, recipient);

        assert_eq!(result, Err(EscrowError::CalculationOverflow));
        assert_eq!(f.account, before);
        assert_eq!(f.bank.balance(&p1), 0);
    }

    #[test]
    fn test_announce_winner_twice_is_not_in_progress() {
        let mut f = fixture("r3", 2, 50);
        let (p1, _) = f.in_progress_with_two();
        let (creator, recipient) = (f.creator, f.recipient);
        f.announce(creator, p1, p1, recipient).unwrap();

        assert_eq!(
            f.announce(creator, p1, p1, recipient),
            Err(EscrowError::RoomNotInProgress)
        );
        assert_eq!(f.bank.balance(&p1), 95);
    }

    #[test]
    fn test_announce_winner_small_pool_pays_everything_to_winner() {
        let mut f = fixture("r4", 2, 5);
        let (_, p2) = f.in_progress_with_two();
        let (creator, recipient) = (f.creator, f.recipient);

        f.announce(creator, p2, p2, recipient).unwrap();

        // floor(10 * 5 / 100) = 0
        assert_eq!(f.bank.balance(&p2), 10);
        assert_eq!(f.bank.balance(&recipient), 0);
    }
}
