//! Zero-based dense rank of a member within its container.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based rank of a member within its container.
///
/// Positions within one container are dense: a container of `n` members
/// holds exactly the positions `0..n-1`, with no gaps and no duplicates.
/// Non-negativity is guaranteed by construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Position(u32);

impl Position {
    /// First position in any container.
    pub const ZERO: Self = Self(0);

    /// Creates a position from a raw rank.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw rank.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the position one rank later.
    #[must_use]
    pub const fn succ(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the position one rank earlier, or `None` at rank zero.
    #[must_use]
    pub const fn pred(self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
