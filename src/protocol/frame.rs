//! LIN frame request
//!
//! # Wire Format
//!
//! ```text
//! master request (master writes data):
//! +-------+------+-----+---------------+-----+
//! | BREAK | SYNC | PID | DATA (1..=8)  | CHK |   all sent by the master
//! +-------+------+-----+---------------+-----+
//!
//! slave response (master reads data):
//! +-------+------+-----+   +---------------+-----+
//! | BREAK | SYNC | PID |   | DATA (1..=8)  | CHK |   sent by the slave
//! +-------+------+-----+   +---------------+-----+
//! ```
//!
//! The bus is single-wire, so everything the master sends is also read back.

use std::fmt;

use super::checksum::{self, ChecksumMode};
use super::{BREAK_BYTE, Error, MAX_DATA_LEN, MAX_FRAME_LEN, ProtectedId, Result, SYNC_BYTE};

/// Who provides the data bytes of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Master sends header and data (master request)
    MasterWrite,
    /// Master sends header, slave sends data (slave response)
    MasterRead,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MasterWrite => write!(f, "write"),
            Self::MasterRead => write!(f, "read"),
        }
    }
}

/// One requested bus transaction
///
/// For [`Direction::MasterRead`] the payload only carries the expected
/// length; its content is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pid: ProtectedId,
    direction: Direction,
    data: [u8; MAX_DATA_LEN],
    len: u8,
    mode: ChecksumMode,
}

impl Frame {
    /// Master request carrying `data` to the slaves
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is above 63 or `data` is not 1..=8 bytes.
    pub fn master_write(id: u8, data: &[u8], mode: ChecksumMode) -> Result<Self> {
        let pid = ProtectedId::new(id)?;
        let len = checked_len(data.len())?;
        let mut buf = [0u8; MAX_DATA_LEN];
        buf[..data.len()].copy_from_slice(data);
        Ok(Self {
            pid,
            direction: Direction::MasterWrite,
            data: buf,
            len,
            mode,
        })
    }

    /// Header asking a slave for `len` data bytes
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is above 63 or `len` is not 1..=8.
    pub fn master_read(id: u8, len: usize, mode: ChecksumMode) -> Result<Self> {
        let pid = ProtectedId::new(id)?;
        let len = checked_len(len)?;
        Ok(Self {
            pid,
            direction: Direction::MasterRead,
            data: [0u8; MAX_DATA_LEN],
            len,
            mode,
        })
    }

    /// Frame identifier (0..=63)
    #[must_use]
    pub const fn id(&self) -> u8 {
        self.pid.id()
    }

    /// Protected identifier
    #[must_use]
    pub const fn pid(&self) -> ProtectedId {
        self.pid
    }

    /// Transfer direction
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Checksum mode
    #[must_use]
    pub const fn checksum_mode(&self) -> ChecksumMode {
        self.mode
    }

    /// Number of data bytes
    #[must_use]
    pub const fn data_len(&self) -> usize {
        self.len as usize
    }

    /// Data to be written (zeros for a read request)
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data[..self.data_len()]
    }

    /// Checksum over the data bytes
    #[must_use]
    pub fn checksum(&self) -> u8 {
        checksum::compute(self.pid.as_u8(), self.data(), self.mode)
    }

    /// Number of bytes the master transmits, break placeholder included
    #[must_use]
    pub const fn tx_len(&self) -> usize {
        match self.direction {
            Direction::MasterWrite => 3 + self.data_len() + 1,
            Direction::MasterRead => 3,
        }
    }

    /// Number of bytes read back from the bus, break echo included
    ///
    /// Same for both directions: the echo covers what the master sent and
    /// the slave fills in the rest.
    #[must_use]
    pub const fn rx_len(&self) -> usize {
        3 + self.data_len() + 1
    }

    /// Fill `buf` with the bytes to transmit and return how many were written
    ///
    /// Layout: break placeholder, sync, PID, and for a master request the
    /// data followed by the checksum.
    pub fn encode_into(&self, buf: &mut [u8; MAX_FRAME_LEN]) -> usize {
        buf[0] = BREAK_BYTE;
        buf[1] = SYNC_BYTE;
        buf[2] = self.pid.as_u8();
        if self.direction == Direction::MasterWrite {
            let end = 3 + self.data_len();
            buf[3..end].copy_from_slice(self.data());
            buf[end] = self.checksum();
        }
        self.tx_len()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} id={:#04x} pid={} len={} chk={}",
            self.direction,
            self.id(),
            self.pid,
            self.len,
            self.mode
        )
    }
}

#[allow(clippy::cast_possible_truncation)]
fn checked_len(len: usize) -> Result<u8> {
    if (1..=MAX_DATA_LEN).contains(&len) {
        // bounded by MAX_DATA_LEN
        Ok(len as u8)
    } else {
        Err(Error::InvalidPayloadLength { len })
    }
}
