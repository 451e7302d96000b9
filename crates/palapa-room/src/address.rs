//! Deterministic record addresses.
//!
//! A room and its vault live at addresses derived from
//! `(tag, creator, seed, bump)`. The caller computes them the same way and
//! sends them with every request; [`RoomKeys::verify`] is the equality
//! check that stops a request from being pointed at someone else's room.

use palapa_protocol::{Address, Identity, KEY_LEN};
use sha2::{Digest, Sha256};

use crate::{EscrowError, MAX_SEED_LEN};

/// Domain separator appended to every derivation input.
const DERIVATION_MARKER: &[u8] = b"palapa-record-address";

/// The two kinds of record a room owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Room,
    Vault,
}

impl RecordKind {
    pub fn tag(&self) -> &'static [u8] {
        match self {
            Self::Room => b"room",
            Self::Vault => b"vault",
        }
    }
}

/// Checks the seed bound: 1..=32 bytes.
pub fn validate_seed(seed: &str) -> Result<(), EscrowError> {
    if seed.is_empty() || seed.len() > MAX_SEED_LEN {
        return Err(EscrowError::InvalidRoomSeed);
    }
    Ok(())
}

/// Computes the address for an explicit bump.
///
/// Fails with `InvalidCreator` if the result falls outside the
/// record-address space, meaning the bump was not one produced by
/// [`derive_address`].
pub fn create_address(
    kind: RecordKind,
    creator: &Identity,
    seed: &str,
    bump: u8,
) -> Result<Address, EscrowError> {
    let candidate = hash_candidate(kind, creator, seed, bump);
    if !candidate.is_record_address() {
        return Err(EscrowError::InvalidCreator);
    }
    Ok(candidate)
}

/// Finds the canonical address and bump, searching bumps from 255 down.
pub fn derive_address(
    kind: RecordKind,
    creator: &Identity,
    seed: &str,
) -> Result<(Address, u8), EscrowError> {
    validate_seed(seed)?;
    (0..=u8::MAX)
        .rev()
        .map(|bump| (hash_candidate(kind, creator, seed, bump), bump))
        .find(|(candidate, _)| candidate.is_record_address())
        .ok_or(EscrowError::BumpSeedNotFound)
}

fn hash_candidate(
    kind: RecordKind,
    creator: &Identity,
    seed: &str,
    bump: u8,
) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(kind.tag());
    hasher.update(creator.as_bytes());
    hasher.update(seed.as_bytes());
    hasher.update([bump]);
    hasher.update(DERIVATION_MARKER);
    let digest: [u8; KEY_LEN] = hasher.finalize().into();
    Address::new(digest)
}

// ---------------------------------------------------------------------------
// RoomKeys
// ---------------------------------------------------------------------------

/// The derived room and vault addresses of one `(creator, seed)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomKeys {
    pub room: Address,
    pub room_bump: u8,
    pub vault: Address,
    pub vault_bump: u8,
}

impl RoomKeys {
    /// Derives both addresses from scratch. Used at room creation and by
    /// clients building requests.
    pub fn derive(creator: &Identity, seed: &str) -> Result<Self, EscrowError> {
        let (room, room_bump) = derive_address(RecordKind::Room, creator, seed)?;
        let (vault, vault_bump) = derive_address(RecordKind::Vault, creator, seed)?;
        Ok(Self {
            room,
            room_bump,
            vault,
            vault_bump,
        })
    }

    /// Recomputes both addresses from the bumps stored in a room record.
    pub fn from_bumps(
        creator: &Identity,
        seed: &str,
        room_bump: u8,
        vault_bump: u8,
    ) -> Result<Self, EscrowError> {
        validate_seed(seed)?;
        Ok(Self {
            room: create_address(RecordKind::Room, creator, seed, room_bump)?,
            room_bump,
            vault: create_address(RecordKind::Vault, creator, seed, vault_bump)?,
            vault_bump,
        })
    }

    /// Rejects the request unless the caller-supplied addresses are exactly
    /// the derived ones.
    pub fn verify(&self, room: &Address, vault: &Address) -> Result<(), EscrowError> {
        if self.room != *room || self.vault != *vault {
            return Err(EscrowError::InvalidCreator);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator() -> Identity {
        Identity::new([7; KEY_LEN])
    }

    #[test]
    fn test_derive_address_is_deterministic() {
        let a = derive_address(RecordKind::Room, &creator(), "r1").unwrap();
        let b = derive_address(RecordKind::Room, &creator(), "r1").unwrap();
        assert_eq!(a, b);
        assert!(a.0.is_record_address());
    }

    #[test]
    fn test_derive_address_differs_by_kind_seed_and_creator() {
        let (room, _) = derive_address(RecordKind::Room, &creator(), "r1").unwrap();
        let (vault, _) = derive_address(RecordKind::Vault, &creator(), "r1").unwrap();
        let (other_seed, _) = derive_address(RecordKind::Room, &creator(), "r2").unwrap();
        let (other_creator, _) =
            derive_address(RecordKind::Room, &Identity::new([8; KEY_LEN]), "r1").unwrap();
        assert_ne!(room, vault);
        assert_ne!(room, other_seed);
        assert_ne!(room, other_creator);
    }

    #[test]
    fn test_derive_address_rejects_bad_seeds() {
        assert_eq!(
            derive_address(RecordKind::Room, &creator(), ""),
            Err(EscrowError::InvalidRoomSeed)
        );
        let long = "x".repeat(MAX_SEED_LEN + 1);
        assert_eq!(
            derive_address(RecordKind::Room, &creator(), &long),
            Err(EscrowError::InvalidRoomSeed)
        );
        let max = "x".repeat(MAX_SEED_LEN);
        assert!(derive_address(RecordKind::Room, &creator(), &max).is_ok());
    }

    #[test]
    fn test_seed_length_counts_bytes_not_chars() {
        // 11 three-byte characters = 33 bytes.
        let seed = "€".repeat(11);
        assert_eq!(validate_seed(&seed), Err(EscrowError::InvalidRoomSeed));
    }

    #[test]
    fn test_create_address_matches_derived_bump() {
        let (addr, bump) = derive_address(RecordKind::Vault, &creator(), "r1").unwrap();
        let again = create_address(RecordKind::Vault, &creator(), "r1", bump).unwrap();
        assert_eq!(addr, again);
    }

    #[test]
    fn test_room_keys_verify_rejects_swapped_addresses() {
        let keys = RoomKeys::derive(&creator(), "r1").unwrap();
        assert!(keys.verify(&keys.room, &keys.vault).is_ok());
        assert_eq!(
            keys.verify(&keys.vault, &keys.room),
            Err(EscrowError::InvalidCreator)
        );
    }

    #[test]
    fn test_room_keys_from_bumps_round_trip() {
        let keys = RoomKeys::derive(&creator(), "sala1").unwrap();
        let again =
            RoomKeys::from_bumps(&creator(), "sala1", keys.room_bump, keys.vault_bump).unwrap();
        assert_eq!(keys, again);
    }

    #[test]
    fn test_room_keys_for_other_creator_do_not_verify() {
        let mine = RoomKeys::derive(&creator(), "r1").unwrap();
        let theirs = RoomKeys::derive(&Identity::new([9; KEY_LEN]), "r1").unwrap();
        assert_eq!(
            theirs.verify(&mine.room, &mine.vault),
            Err(EscrowError::InvalidCreator)
        );
    }
}
