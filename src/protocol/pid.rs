//! Protected identifier (frame ID plus two parity bits)
//!
//! ```text
//!   7    6    5    4    3    2    1    0
//! +----+----+----+----+----+----+----+----+
//! | P1 | P0 | ID5| ID4| ID3| ID2| ID1| ID0|
//! +----+----+----+----+----+----+----+----+
//!
//! P0 =   ID0 ^ ID1 ^ ID2 ^ ID4
//! P1 = !(ID1 ^ ID3 ^ ID4 ^ ID5)
//! ```

use std::fmt;

use super::{Error, MAX_IDENTIFIER, Result};

/// Frame identifier extended with its parity bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtectedId(u8);

impl ProtectedId {
    /// Build the protected identifier for a 6-bit frame identifier
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] if `id` is above 63.
    pub fn new(id: u8) -> Result<Self> {
        if id > MAX_IDENTIFIER {
            return Err(Error::InvalidIdentifier { id });
        }
        Ok(Self(id | parity_bits(id)))
    }

    /// Accept a raw byte only if its parity bits are correct
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        if verify_protected_identifier(byte) {
            Some(Self(byte))
        } else {
            None
        }
    }

    /// Frame identifier without parity
    #[must_use]
    pub const fn id(self) -> u8 {
        self.0 & MAX_IDENTIFIER
    }

    /// Byte as it appears on the wire
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ProtectedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

const fn parity_bits(id: u8) -> u8 {
    let p0 = (id ^ (id >> 1) ^ (id >> 2) ^ (id >> 4)) & 0x01;
    let p1 = !((id >> 1) ^ (id >> 3) ^ (id >> 4) ^ (id >> 5)) & 0x01;
    (p0 << 6) | (p1 << 7)
}

/// Check the parity bits of a received protected identifier byte
#[must_use]
pub const fn verify_protected_identifier(byte: u8) -> bool {
    let id = byte & MAX_IDENTIFIER;
    (id | parity_bits(id)) == byte
}
