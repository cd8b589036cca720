//! Shared identifier wrappers for Wayfinder.
//!
//! All identifiers are counters handed out by the store that owns them, so
//! they are plain `u64` newtypes rather than random ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when parsing a counter-backed identifier fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    message: String,
}

impl IdParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdParseError {}

macro_rules! define_counter_id {
    ($name:ident, $label:expr) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn value(&self) -> u64 {
                self.0
            }

            /// The id following this one in the counter sequence.
            pub const fn next(&self) -> Self {
                Self(self.0 + 1)
            }

            /// Advance by `count` steps (bulk allocation).
            pub const fn advance(&self, count: u64) -> Self {
                Self(self.0 + count)
            }

            pub fn parse(value: &str) -> Result<Self, IdParseError> {
                value
                    .trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|e| IdParseError::new(format!("Invalid {}: {}", $label, e)))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

define_counter_id!(PointId, "point ID");
define_counter_id!(BatchSeq, "request batch sequence");
define_counter_id!(ListenerId, "listener ID");
