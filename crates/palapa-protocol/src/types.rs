//! Identity and value types shared by every Palapa layer.
//!
//! Everything that names an actor or a record is a 32-byte key. Two
//! newtypes keep the roles apart:
//!
//! - [`Identity`] — an authenticated actor (creator, player, winner, fee
//!   recipient). Balances in the ledger are keyed by identity.
//! - [`Address`] — a record derived by the engine (a room or its vault).
//!
//! Both serialize as lowercase hex strings so that JSON payloads stay
//! readable in logs and browser devtools.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Amount of value in the smallest indivisible unit.
pub type Lamports = u64;

/// Seconds since the Unix epoch.
pub type UnixTimestamp = i64;

/// Length in bytes of identities and addresses.
pub const KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An opaque, globally unique actor reference.
///
/// The hosting environment authenticates every request, so by the time an
/// `Identity` reaches the engine it is trusted to be the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; KEY_LEN]);

impl Identity {
    /// Wraps raw key bytes.
    pub const fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Generates a fresh random identity.
    ///
    /// The high bit of the final byte is cleared. Derived record addresses
    /// always have it set, so a generated identity never aliases a room or
    /// vault.
    pub fn new_unique() -> Self {
        let mut bytes: [u8; KEY_LEN] = rand::rng().random();
        bytes[KEY_LEN - 1] &= 0x7f;
        Self(bytes)
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s).map(Self)
    }
}

impl TryFrom<String> for Identity {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// The address of an engine-owned record (a room or a vault).
///
/// Addresses are never chosen by callers; they are derived from the
/// creator and seed. Callers echo them back with every request and the
/// engine re-derives them to detect substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; KEY_LEN]);

impl Address {
    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Returns `true` if this address lies in the record-address space
    /// (high bit of the final byte set).
    pub fn is_record_address(&self) -> bool {
        self.0[KEY_LEN - 1] & 0x80 != 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s).map(Self)
    }
}

impl TryFrom<String> for Address {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

fn parse_key(s: &str) -> Result<[u8; KEY_LEN], ProtocolError> {
    let raw = hex::decode(s)
        .map_err(|e| ProtocolError::InvalidKey(format!("{s:?}: {e}")))?;
    raw.try_into().map_err(|raw: Vec<u8>| {
        ProtocolError::InvalidKey(format!(
            "expected {KEY_LEN} bytes, got {}",
            raw.len()
        ))
    })
}
