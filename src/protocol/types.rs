//! Transaction state and accumulated error flags

use std::fmt;

/// State of the frame state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum State {
    /// No transaction in flight
    #[default]
    Idle = 0x00,
    /// Break issued, waiting for it to complete
    Break = 0x01,
    /// Header (and body) sent, waiting for echo and response
    Body = 0x02,
    /// Transaction finished, result available
    Done = 0x03,
}

impl State {
    /// Convert from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Idle),
            0x01 => Some(Self::Break),
            0x02 => Some(Self::Body),
            0x03 => Some(Self::Done),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if a transaction is currently in flight
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Break | Self::Body)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Break => "BREAK",
            Self::Body => "BODY",
            Self::Done => "DONE",
        };
        write!(f, "{name}")
    }
}

/// Faults observed during one transaction
///
/// Bits are OR-combined as faults are detected and are only cleared when the
/// next transaction starts, so the final value lists every abnormal condition
/// seen on the way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorFlags(u8);

impl ErrorFlags {
    /// No fault
    pub const OK: u8 = 0x00;
    /// A step was entered in a state it does not expect
    pub const ILLEGAL_STATE: u8 = 1 << 0;
    /// Read-back bytes differ from the transmitted bytes
    pub const ECHO_MISMATCH: u8 = 1 << 1;
    /// Transaction deadline elapsed
    pub const TIMEOUT: u8 = 1 << 2;
    /// Response checksum is wrong
    pub const CHECKSUM_MISMATCH: u8 = 1 << 3;
    /// The serial port reported a failure
    pub const TRANSPORT: u8 = 1 << 7;

    /// Valid flag bits mask
    pub const VALID_MASK: u8 = Self::ILLEGAL_STATE
        | Self::ECHO_MISMATCH
        | Self::TIMEOUT
        | Self::CHECKSUM_MISMATCH
        | Self::TRANSPORT;

    /// Create empty flags
    #[must_use]
    pub const fn new() -> Self {
        Self(Self::OK)
    }

    /// Create from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        if value & !Self::VALID_MASK == 0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Set a flag
    #[must_use]
    pub const fn with(mut self, flag: u8) -> Self {
        debug_assert!(flag & !Self::VALID_MASK == 0, "invalid flag bit");
        self.0 |= flag;
        self
    }

    /// Set a flag in place
    pub fn insert(&mut self, flag: u8) {
        *self = self.with(flag);
    }

    /// Check if flag is set
    #[must_use]
    pub const fn has(self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }

    /// Check if no fault was recorded
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.0 == Self::OK
    }

    /// Check for an illegal state fault
    #[must_use]
    pub const fn is_illegal_state(self) -> bool {
        self.has(Self::ILLEGAL_STATE)
    }

    /// Check for an echo mismatch
    #[must_use]
    pub const fn is_echo_mismatch(self) -> bool {
        self.has(Self::ECHO_MISMATCH)
    }

    /// Check for a timeout
    #[must_use]
    pub const fn is_timeout(self) -> bool {
        self.has(Self::TIMEOUT)
    }

    /// Check for a checksum mismatch
    #[must_use]
    pub const fn is_checksum_mismatch(self) -> bool {
        self.has(Self::CHECKSUM_MISMATCH)
    }

    /// Check for a transport failure
    #[must_use]
    pub const fn is_transport(self) -> bool {
        self.has(Self::TRANSPORT)
    }
}

impl fmt::Display for ErrorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.is_illegal_state() {
            parts.push("ILLEGAL_STATE");
        }
        if self.is_echo_mismatch() {
            parts.push("ECHO_MISMATCH");
        }
        if self.is_timeout() {
            parts.push("TIMEOUT");
        }
        if self.is_checksum_mismatch() {
            parts.push("CHECKSUM_MISMATCH");
        }
        if self.is_transport() {
            parts.push("TRANSPORT");
        }
        if parts.is_empty() {
            write!(f, "OK")
        } else {
            write!(f, "{}", parts.join(" | "))
        }
    }
}
