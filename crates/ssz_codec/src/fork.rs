// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! Fork enumeration and fork-gated field filters.
//!
//! Forks form a total order, so a field's presence can be expressed as a
//! half-open `[added, removed)` range and checked with a pair of
//! comparisons. Consensus-layer fork names are aliases for the execution
//! forks they activated alongside.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// A named point in the totally-ordered chain history.
///
/// The numeric ordering of the variants is the activation ordering, so
/// `Fork` comparisons are fork-schedule comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Fork {
    /// Fork not known; every fork-gated field is treated as absent.
    #[default]
    Unknown,
    /// Original mainnet launch rules.
    Frontier,
    /// Homestead fork.
    Homestead,
    /// Tangerine Whistle fork.
    Tangerine,
    /// Spurious Dragon fork.
    SpuriousDragon,
    /// Byzantium fork.
    Byzantium,
    /// Constantinople fork.
    Constantinople,
    /// Istanbul fork.
    Istanbul,
    /// Muir Glacier fork.
    MuirGlacier,
    /// Berlin fork.
    Berlin,
    /// London fork.
    London,
    /// Arrow Glacier fork.
    ArrowGlacier,
    /// Gray Glacier fork.
    GrayGlacier,
    /// Paris fork (the Merge).
    Paris,
    /// Shanghai fork.
    Shanghai,
    /// Cancun fork.
    Cancun,
    /// Prague fork.
    Prague,
    /// Osaka fork.
    Osaka,
    /// Sentinel ordered after every scheduled fork.
    Future,
}

impl Fork {
    /// Consensus-layer alias: Bellatrix activated with Paris.
    pub const BELLATRIX: Fork = Fork::Paris;
    /// Consensus-layer alias: Capella activated with Shanghai.
    pub const CAPELLA: Fork = Fork::Shanghai;
    /// Consensus-layer alias: Deneb activated with Cancun.
    pub const DENEB: Fork = Fork::Cancun;
    /// Consensus-layer alias: Electra activated with Prague.
    pub const ELECTRA: Fork = Fork::Prague;
    /// Consensus-layer alias: Fulu activated with Osaka.
    pub const FULU: Fork = Fork::Osaka;

    /// Canonical lowercase name of the fork.
    pub const fn name(&self) -> &'static str {
        match self {
            Fork::Unknown => "unknown",
            Fork::Frontier => "frontier",
            Fork::Homestead => "homestead",
            Fork::Tangerine => "tangerine",
            Fork::SpuriousDragon => "spurious",
            Fork::Byzantium => "byzantium",
            Fork::Constantinople => "constantinople",
            Fork::Istanbul => "istanbul",
            Fork::MuirGlacier => "muir",
            Fork::Berlin => "berlin",
            Fork::London => "london",
            Fork::ArrowGlacier => "arrow",
            Fork::GrayGlacier => "gray",
            Fork::Paris => "paris",
            Fork::Shanghai => "shanghai",
            Fork::Cancun => "cancun",
            Fork::Prague => "prague",
            Fork::Osaka => "osaka",
            Fork::Future => "future",
        }
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a fork tag names no known fork.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fork name {name:?}")]
pub struct ParseForkError {
    /// The unrecognized name
    pub name: String,
}

impl FromStr for Fork {
    type Err = ParseForkError;

    /// Parse an execution- or consensus-layer fork name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fork = match s {
            "unknown" => Fork::Unknown,
            "frontier" => Fork::Frontier,
            "homestead" => Fork::Homestead,
            "tangerine" => Fork::Tangerine,
            "spurious" => Fork::SpuriousDragon,
            "byzantium" => Fork::Byzantium,
            "constantinople" => Fork::Constantinople,
            "istanbul" => Fork::Istanbul,
            "muir" => Fork::MuirGlacier,
            "berlin" => Fork::Berlin,
            "london" => Fork::London,
            "arrow" => Fork::ArrowGlacier,
            "gray" => Fork::GrayGlacier,
            "paris" | "bellatrix" => Fork::Paris,
            "shanghai" | "capella" => Fork::Shanghai,
            "cancun" | "deneb" => Fork::Cancun,
            "prague" | "electra" => Fork::Prague,
            "osaka" | "fulu" => Fork::Osaka,
            "future" => Fork::Future,
            other => {
                return Err(ParseForkError {
                    name: other.to_string(),
                });
            }
        };
        Ok(fork)
    }
}

/// Half-open `[added, removed)` presence range for a fork-gated field.
///
/// `Fork::Unknown` acts as the unbounded sentinel on either side: an
/// `added` of `Unknown` means the field existed from the start, a
/// `removed` of `Unknown` means it was never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkFilter {
    /// Fork the field was added at, inclusive.
    pub added: Fork,
    /// Fork the field was removed at, exclusive.
    pub removed: Fork,
}

impl ForkFilter {
    /// Filter for a field present in `[added, removed)`.
    pub const fn new(added: Fork, removed: Fork) -> Self {
        Self { added, removed }
    }

    /// Filter for a field added at `fork` and never removed.
    pub const fn since(fork: Fork) -> Self {
        Self::new(fork, Fork::Unknown)
    }

    /// Filter for a field present from the start and removed at `fork`.
    pub const fn until(fork: Fork) -> Self {
        Self::new(Fork::Unknown, fork)
    }

    /// Parse a schema fork tag: `"name"` adds at the fork, `"!name"`
    /// removes at it.
    pub fn parse(tag: &str) -> Result<Self, ParseForkError> {
        match tag.strip_prefix('!') {
            Some(name) => Ok(Self::until(name.parse()?)),
            None => Ok(Self::since(tag.parse()?)),
        }
    }

    /// Whether a field gated by this filter is present at `fork`.
    pub fn covers(&self, fork: Fork) -> bool {
        if fork < self.added {
            return false;
        }
        self.removed == Fork::Unknown || fork < self.removed
    }
}
