//! Engine configuration, limits, and the clock.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use palapa_protocol::{Identity, Lamports, UnixTimestamp};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Longest accepted room seed, in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Fewest players a room may be created for.
pub const MIN_PLAYERS: u16 = 2;

/// Storage ceiling on `max_players`.
pub const MAX_PLAYERS_LIMIT: u16 = 10;

// ---------------------------------------------------------------------------
// FeeRate
// ---------------------------------------------------------------------------

/// The share of a pool kept as service fee, as an exact fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRate {
    pub numerator: u64,
    pub denominator: u64,
}

impl FeeRate {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// `floor(pool * numerator / denominator)`, or `None` on overflow or a
    /// zero denominator.
    pub fn fee_on(&self, pool: Lamports) -> Option<Lamports> {
        pool.checked_mul(self.numerator)?
            .checked_div(self.denominator)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.denominator == 0 || self.numerator > self.denominator {
            return Err(ConfigError::InvalidFeeRate {
                numerator: self.numerator,
                denominator: self.denominator,
            });
        }
        Ok(())
    }
}

/// 5%.
impl Default for FeeRate {
    fn default() -> Self {
        Self::new(5, 100)
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Settings fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The only identity allowed to receive service fees.
    pub fee_recipient: Identity,
    #[serde(default)]
    pub fee_rate: FeeRate,
}

impl EngineConfig {
    pub fn new(fee_recipient: Identity) -> Self {
        Self {
            fee_recipient,
            fee_rate: FeeRate::default(),
        }
    }

    /// Checks the configuration once, before any room is served.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fee_rate.validate()
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the timestamps written into room records.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> UnixTimestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixTimestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as UnixTimestamp)
            .unwrap_or_default()
    }
}

/// A clock that only moves when told to. For tests and replays.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn new(at: UnixTimestamp) -> Self {
        Self(AtomicI64::new(at))
    }

    pub fn set(&self, at: UnixTimestamp) {
        self.0.store(at, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> UnixTimestamp {
        self.0.load(Ordering::SeqCst)
    }
}
