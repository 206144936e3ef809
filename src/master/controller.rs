//! Public LIN master: request API, polling, and results.

use tracing::{debug, info, instrument, warn};

use super::config::MasterConfig;
use super::machine::FrameMachine;
use super::stats::MasterStats;
use crate::protocol::{ChecksumMode, Error, ErrorFlags, Frame, Result, State};
use crate::transport::{Clock, SerialPort};

/// Outcome of a finished transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<'a> {
    /// Every fault observed during the transaction.
    pub errors: ErrorFlags,
    /// Data bytes, present only when `errors` is OK.
    ///
    /// For a slave response these are the bytes the slave sent; for a master
    /// request they are the echo of the bytes the master sent.
    pub payload: Option<&'a [u8]>,
}

impl Response<'_> {
    /// Whether the transaction finished without fault.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.errors.is_ok()
    }
}

/// LIN master node driving one bus.
///
/// One transaction at a time: start it with [`start_transaction`], call
/// [`poll`] until it returns [`State::Done`], then read [`result`].
///
/// [`start_transaction`]: LinMaster::start_transaction
/// [`poll`]: LinMaster::poll
/// [`result`]: LinMaster::result
#[derive(Debug)]
pub struct LinMaster<P, C> {
    port: P,
    clock: C,
    config: MasterConfig,
    machine: FrameMachine,
    stats: MasterStats,
    time_per_byte_us: u32,
    open: bool,
    recorded: bool,
}

impl<P: SerialPort, C: Clock> LinMaster<P, C> {
    /// Create a master over `port`. The port is not touched until [`begin`].
    ///
    /// [`begin`]: LinMaster::begin
    #[must_use]
    pub fn new(port: P, clock: C, config: MasterConfig) -> Self {
        let machine = FrameMachine::new(config.break_exit);
        Self {
            port,
            clock,
            config,
            machine,
            stats: MasterStats::default(),
            time_per_byte_us: 0,
            open: false,
            recorded: true,
        }
    }

    /// Open the serial port at the configured rate and reset the machine.
    ///
    /// # Errors
    ///
    /// Returns an error if the bit rate is zero or the port fails to open.
    #[instrument(level = "debug", skip(self), fields(name = %self.config.name))]
    pub fn begin(&mut self) -> Result<()> {
        let baudrate = self.config.baudrate;
        let time_per_byte_us = self
            .config
            .time_per_byte_us()
            .ok_or(Error::InvalidBaudRate { baudrate })?;

        self.port
            .open(baudrate)
            .map_err(|e| Error::Transport(format!("failed to open port: {e:?}")))?;

        self.time_per_byte_us = time_per_byte_us;
        self.machine.configure(baudrate, time_per_byte_us);
        self.machine.reset();
        self.recorded = true;
        self.open = true;
        info!(
            baudrate,
            time_per_byte_us,
            break_exit = %self.config.break_exit,
            "LIN master started"
        );
        Ok(())
    }

    /// Close the serial port. Any transaction in flight is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the port fails to close.
    #[instrument(level = "debug", skip(self), fields(name = %self.config.name))]
    pub fn end(&mut self) -> Result<()> {
        self.abandon();
        self.open = false;
        self.port
            .close()
            .map_err(|e| Error::Transport(format!("failed to close port: {e:?}")))?;
        info!("LIN master stopped");
        Ok(())
    }

    /// Start a transaction and send its break.
    ///
    /// Accepted in `IDLE` or `DONE`; the previous result is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] before [`begin`], and
    /// [`Error::IllegalState`] while another transaction is in flight. In
    /// the latter case the in-flight transaction is ended with
    /// `ILLEGAL_STATE`.
    ///
    /// [`begin`]: LinMaster::begin
    #[instrument(
        level = "debug",
        skip(self, frame),
        fields(name = %self.config.name, frame = %frame)
    )]
    pub fn start_transaction(&mut self, frame: &Frame) -> Result<()> {
        if !self.open {
            return Err(Error::NotOpen);
        }

        let state = self.machine.state();
        if state.is_busy() {
            warn!(%state, "transaction requested while busy");
            self.machine.fail(ErrorFlags::ILLEGAL_STATE);
            self.settle();
            return Err(Error::IllegalState { state });
        }

        let time_max_us = self
            .config
            .transaction_timeout_us(self.time_per_byte_us, frame.rx_len());
        self.machine.reset();
        self.machine.load(frame, time_max_us, &self.clock);
        self.stats.record_start();
        self.recorded = false;

        debug!(time_max_us, "transaction started");
        self.machine.send_break(&mut self.port, &self.clock);
        self.settle();
        Ok(())
    }

    /// Start a master request writing `data` to frame `id`.
    ///
    /// # Errors
    ///
    /// See [`Frame::master_write`] and [`start_transaction`].
    ///
    /// [`start_transaction`]: LinMaster::start_transaction
    pub fn send_master_request(&mut self, id: u8, data: &[u8], mode: ChecksumMode) -> Result<()> {
        let frame = Frame::master_write(id, data, mode)?;
        self.start_transaction(&frame)
    }

    /// Start a header asking the slave owning frame `id` for `len` bytes.
    ///
    /// # Errors
    ///
    /// See [`Frame::master_read`] and [`start_transaction`].
    ///
    /// [`start_transaction`]: LinMaster::start_transaction
    pub fn receive_slave_response(&mut self, id: u8, len: usize, mode: ChecksumMode) -> Result<()> {
        let frame = Frame::master_read(id, len, mode)?;
        self.start_transaction(&frame)
    }

    /// Advance the transaction by at most one step and return the new state.
    ///
    /// Never blocks. Once `DONE` is reached, further calls change nothing
    /// until the next transaction starts.
    #[instrument(level = "trace", skip(self), fields(name = %self.config.name))]
    pub fn poll(&mut self) -> State {
        let before = self.machine.state();
        let after = self.machine.poll(&mut self.port, &self.clock);
        if before != after {
            debug!(from = %before, to = %after, "state transition");
        }
        self.settle();
        after
    }

    /// Result of the last transaction, once it is `DONE`.
    #[must_use]
    pub fn result(&self) -> Option<Response<'_>> {
        if self.machine.state() != State::Done {
            return None;
        }
        Some(Response {
            errors: self.machine.errors(),
            payload: self.machine.payload(),
        })
    }

    /// Poll until the transaction is `DONE` and return its result.
    ///
    /// This spins on the calling thread; the clock must keep advancing for
    /// timeouts to fire. Returns `None` if no transaction was started.
    pub fn run_to_completion(&mut self) -> Option<Response<'_>> {
        while self.poll().is_busy() {
            std::hint::spin_loop();
        }
        self.result()
    }

    /// Force the state machine back to `IDLE`.
    ///
    /// Drops a transaction in flight without recording a result. Bytes
    /// already on the wire are not recalled.
    pub fn reset(&mut self) {
        self.abandon();
    }

    fn abandon(&mut self) {
        let state = self.machine.state();
        if state.is_busy() {
            debug!(name = %self.config.name, %state, "transaction abandoned");
            FrameMachine::finish(&mut self.port);
        }
        self.machine.reset();
        self.recorded = true;
    }

    fn settle(&mut self) {
        if self.recorded || self.machine.state() != State::Done {
            return;
        }
        self.recorded = true;
        let errors = self.machine.errors();
        self.stats.record_done(errors);
        if errors.is_ok() {
            debug!(name = %self.config.name, "transaction complete");
        } else {
            warn!(name = %self.config.name, %errors, "transaction failed");
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> State {
        self.machine.state()
    }

    /// Faults accumulated by the current or last transaction.
    #[must_use]
    pub fn errors(&self) -> ErrorFlags {
        self.machine.errors()
    }

    /// Frame of the current or last transaction.
    #[must_use]
    pub fn frame(&self) -> Option<&Frame> {
        self.machine.frame()
    }

    /// Bytes transmitted for the current or last frame, starting with the
    /// break placeholder.
    #[must_use]
    pub fn tx_bytes(&self) -> &[u8] {
        self.machine.tx_bytes()
    }

    /// Bytes read back for the current or last frame.
    #[must_use]
    pub fn rx_bytes(&self) -> &[u8] {
        self.machine.rx_bytes()
    }

    /// Whether [`begin`](LinMaster::begin) has been called without a matching `end`.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Transaction counters.
    #[must_use]
    pub const fn stats(&self) -> &MasterStats {
        &self.stats
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &MasterConfig {
        &self.config
    }

    /// Duration of one byte at the nominal rate (zero before `begin`).
    #[must_use]
    pub const fn time_per_byte_us(&self) -> u32 {
        self.time_per_byte_us
    }

    /// Deadline of the current or last transaction.
    #[must_use]
    pub fn time_max_us(&self) -> u32 {
        self.machine.time_max_us()
    }

    /// Serial port.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the serial port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Clock.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Give back the port and clock.
    pub fn into_parts(self) -> (P, C) {
        (self.port, self.clock)
    }
}
