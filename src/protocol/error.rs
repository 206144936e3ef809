//! LIN master error types

use thiserror::Error;

use super::State;

/// Errors returned by the request API
///
/// Faults that happen on the bus while a transaction runs are not reported
/// here; they accumulate in [`ErrorFlags`](super::ErrorFlags).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Frame identifier outside 0..=63
    #[error("invalid frame identifier: {id:#04x} (max 0x3f)")]
    InvalidIdentifier {
        /// Rejected identifier
        id: u8,
    },

    /// Payload length outside 1..=8
    #[error("invalid payload length: {len} bytes (expected 1..=8)")]
    InvalidPayloadLength {
        /// Rejected length
        len: usize,
    },

    /// Request issued while another transaction is in flight
    #[error("illegal state for request: {state}")]
    IllegalState {
        /// State found when the request arrived
        state: State,
    },

    /// Bit rate unusable for timing
    #[error("invalid baud rate: {baudrate}")]
    InvalidBaudRate {
        /// Rejected rate
        baudrate: u32,
    },

    /// Request issued before `begin()`
    #[error("serial port not open")]
    NotOpen,

    /// Serial port failure outside a transaction
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
