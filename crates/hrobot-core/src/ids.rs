//! Strongly-typed identifiers for Robot resources.
//!
//! Robot addresses servers and vSwitches by plain integers. Wrapping them keeps
//! a server number from being passed where a vSwitch id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Macro to generate strongly-typed numeric identifier types.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an identifier from its numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Returns the numeric value.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Parses an identifier from a decimal string.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is not a non-negative integer that fits in `u32`.
            pub fn parse_str(input: &str) -> Result<Self> {
                input
                    .trim()
                    .parse::<u32>()
                    .map(Self)
                    .map_err(|_| Error::InvalidId(format!("{}: `{input}`", stringify!($name))))
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = Error;

            fn try_from(value: i64) -> Result<Self> {
                u32::try_from(value)
                    .map(Self)
                    .map_err(|_| Error::InvalidId(format!("{}: {value} is out of range", stringify!($name))))
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(ServerNumber, "Dedicated server number");
numeric_id!(VSwitchId, "vSwitch identifier");
