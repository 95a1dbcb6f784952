//! Rate of perceived exertion.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Self-reported session intensity.
///
/// Stored as an optional integer. `Unrated` is shown as "no rating" and is
/// never silently turned into a number here; the adjustment policy applies
/// its own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Option<u8>", into = "Option<u8>")]
pub enum Rpe {
    Rated(u8),
    #[default]
    Unrated,
}

/// An RPE value outside 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("RPE must be between 1 and 10, got {0}")]
pub struct RpeOutOfRange(pub u8);

impl Rpe {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Creates a rated value, rejecting anything outside 1..=10.
    pub fn rated(value: u8) -> Result<Self, RpeOutOfRange> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self::Rated(value))
        } else {
            Err(RpeOutOfRange(value))
        }
    }

    pub fn value(self) -> Option<u8> {
        match self {
            Self::Rated(v) => Some(v),
            Self::Unrated => None,
        }
    }

    pub fn is_unrated(&self) -> bool {
        matches!(self, Self::Unrated)
    }
}

impl TryFrom<Option<u8>> for Rpe {
    type Error = RpeOutOfRange;

    fn try_from(value: Option<u8>) -> Result<Self, Self::Error> {
        value.map_or(Ok(Self::Unrated), Self::rated)
    }
}

impl From<Rpe> for Option<u8> {
    fn from(rpe: Rpe) -> Self {
        rpe.value()
    }
}

impl fmt::Display for Rpe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rated(v) => write!(f, "RPE {v}"),
            Self::Unrated => f.write_str("no rating"),
        }
    }
}
