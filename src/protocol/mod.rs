//! LIN wire-level pieces
//!
//! This module provides the protected identifier, the checksum engine, the
//! frame layout, and the state and error types shared with the driver.

pub mod checksum;
mod error;
mod frame;
mod pid;
mod types;

pub use checksum::ChecksumMode;
pub use error::{Error, Result};
pub use frame::{Direction, Frame};
pub use pid::{ProtectedId, verify_protected_identifier};
pub use types::{ErrorFlags, State};

/// Sync field, sent right after the break
pub const SYNC_BYTE: u8 = 0x55;

/// Byte written at half baud rate to produce the break
pub const BREAK_BYTE: u8 = 0x00;

/// Highest frame identifier (6 bits)
pub const MAX_IDENTIFIER: u8 = 0x3F;

/// Maximum number of data bytes in a frame
pub const MAX_DATA_LEN: usize = 8;

/// Break + sync + PID + data + checksum
pub const MAX_FRAME_LEN: usize = 3 + MAX_DATA_LEN + 1;

/// Diagnostic master request frame identifier
pub const DIAGNOSTIC_MASTER_REQUEST: u8 = 0x3C;

/// Diagnostic slave response frame identifier
pub const DIAGNOSTIC_SLAVE_RESPONSE: u8 = 0x3D;
