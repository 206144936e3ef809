//! Simulated single-wire LIN bus for host-side testing.
//!
//! Every byte the master writes is echoed back, as on a real half-duplex
//! line. Slaves are modelled as scripted responses keyed by protected
//! identifier: once the header (sync + PID) has been written, the matching
//! response is placed on the bus after the echo.
//!
//! Wire time is optional: with a byte time set, bytes occupy the line one
//! after another (the break takes two byte-times at half rate) and only
//! arrive once their last bit has been sent.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;
use tracing::trace;

use super::{Clock, ManualClock, SerialPort};
use crate::protocol::{self, BREAK_BYTE, ChecksumMode, ProtectedId, checksum};

/// Failures injected into the simulated bus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoopbackError {
    /// The bus was disconnected via [`LoopbackBus::disconnect`].
    #[error("loopback bus disconnected")]
    Disconnected,
}

#[derive(Debug, Clone, Copy)]
struct PendingByte {
    value: u8,
    ready_at: u32,
}

const HALF_RANGE: u32 = 1 << 31;

/// Whether wrapping timestamp `t` is at or before `now`.
const fn reached(now: u32, t: u32) -> bool {
    now.wrapping_sub(t) < HALF_RANGE
}

/// In-memory half-duplex bus with scripted slaves.
#[derive(Debug)]
pub struct LoopbackBus {
    clock: ManualClock,
    rx: VecDeque<PendingByte>,
    responses: HashMap<u8, Vec<u8>>,
    frame: Vec<u8>,
    sent: Vec<u8>,
    baud_history: Vec<u32>,
    breaks: usize,
    availability_lag_us: u32,
    byte_time_us: u32,
    wire_free_at: Option<u32>,
    corrupt_echo: Option<(usize, u8)>,
    open: bool,
    connected: bool,
    tx_active: bool,
    rx_active: bool,
}

impl LoopbackBus {
    /// Create an idle bus that reads time from `clock`.
    #[must_use]
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            rx: VecDeque::new(),
            responses: HashMap::new(),
            frame: Vec::new(),
            sent: Vec::new(),
            baud_history: Vec::new(),
            breaks: 0,
            availability_lag_us: 0,
            byte_time_us: 0,
            wire_free_at: None,
            corrupt_echo: None,
            open: false,
            connected: true,
            tx_active: false,
            rx_active: false,
        }
    }

    /// Report received bytes only `lag_us` microseconds after they were written.
    #[must_use]
    pub fn with_availability_lag(mut self, lag_us: u32) -> Self {
        self.availability_lag_us = lag_us;
        self
    }

    /// Give every byte `byte_time_us` of wire time before it arrives.
    #[must_use]
    pub fn with_byte_time(mut self, byte_time_us: u32) -> Self {
        self.byte_time_us = byte_time_us;
        self
    }

    /// Script a slave answering frame `id` with `data` and a valid checksum.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a valid frame identifier.
    pub fn respond(&mut self, id: u8, data: &[u8], mode: ChecksumMode) -> protocol::Result<()> {
        let pid = ProtectedId::new(id)?;
        let mut bytes = data.to_vec();
        bytes.push(checksum::compute(pid.as_u8(), data, mode));
        self.responses.insert(pid.as_u8(), bytes);
        Ok(())
    }

    /// Script a slave answering `pid` with exactly `bytes` (checksum included).
    pub fn respond_raw(&mut self, pid: u8, bytes: &[u8]) {
        self.responses.insert(pid, bytes.to_vec());
    }

    /// Remove every scripted slave.
    pub fn clear_responses(&mut self) {
        self.responses.clear();
    }

    /// XOR the echo of frame byte `index` (0 = break) with `mask`.
    pub fn corrupt_echo(&mut self, index: usize, mask: u8) {
        self.corrupt_echo = Some((index, mask));
    }

    /// Make every subsequent port operation fail.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Bytes written by the master, breaks included.
    #[must_use]
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// Bit rates set on the port, oldest first.
    #[must_use]
    pub fn baud_history(&self) -> &[u32] {
        &self.baud_history
    }

    /// Number of breaks sent.
    #[must_use]
    pub const fn breaks(&self) -> usize {
        self.breaks
    }

    /// Whether the port is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Current state of the (tx, rx) activity indicators.
    #[must_use]
    pub const fn indicators(&self) -> (bool, bool) {
        (self.tx_active, self.rx_active)
    }

    fn check(&self) -> Result<(), LoopbackError> {
        if self.connected {
            Ok(())
        } else {
            Err(LoopbackError::Disconnected)
        }
    }

    /// Put `value` on the wire for `duration_us` after whatever is already
    /// being sent.
    fn push_rx(&mut self, value: u8, duration_us: u32) {
        let now = self.clock.now_micros();
        let start = match self.wire_free_at {
            Some(free_at) if !reached(now, free_at) => free_at,
            _ => now,
        };
        let arrived = start.wrapping_add(duration_us);
        self.wire_free_at = Some(arrived);
        let ready_at = arrived.wrapping_add(self.availability_lag_us);
        self.rx.push_back(PendingByte { value, ready_at });
    }

    fn echo(&mut self, byte: u8, duration_us: u32) {
        let index = self.frame.len();
        let value = match self.corrupt_echo {
            Some((at, mask)) if at == index => byte ^ mask,
            _ => byte,
        };
        self.frame.push(byte);
        self.sent.push(byte);
        self.push_rx(value, duration_us);

        // break, sync and PID written: the addressed slave answers
        if self.frame.len() == 3 {
            if let Some(response) = self.responses.get(&self.frame[2]).cloned() {
                trace!(pid = self.frame[2], len = response.len(), "slave responds");
                for value in response {
                    self.push_rx(value, self.byte_time_us);
                }
            }
        }
    }

    fn ready(&self) -> usize {
        let now = self.clock.now_micros();
        self.rx
            .iter()
            .take_while(|b| reached(now, b.ready_at))
            .count()
    }
}

impl SerialPort for LoopbackBus {
    type Error = LoopbackError;

    fn open(&mut self, baudrate: u32) -> Result<(), Self::Error> {
        self.check()?;
        self.open = true;
        self.set_baud_rate(baudrate)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.open = false;
        self.rx.clear();
        Ok(())
    }

    fn set_baud_rate(&mut self, baudrate: u32) -> Result<(), Self::Error> {
        self.check()?;
        self.baud_history.push(baudrate);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.check()
    }

    fn discard_input(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.rx.clear();
        Ok(())
    }

    fn send_break(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.breaks += 1;
        self.frame.clear();
        self.wire_free_at = None;
        self.echo(BREAK_BYTE, self.byte_time_us.saturating_mul(2));
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check()?;
        for &byte in bytes {
            self.echo(byte, self.byte_time_us);
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        self.check()?;
        Ok(self.ready())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.check()?;
        let count = self.ready().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..count)) {
            *slot = byte.value;
        }
        Ok(count)
    }

    fn indicate_tx(&mut self, active: bool) {
        self.tx_active = active;
    }

    fn indicate_rx(&mut self, active: bool) {
        self.rx_active = active;
    }
}
