//! Frame state machine: break, header, body, validation.
//!
//! ```text
//!  IDLE --send_break--> BREAK --send_frame--> BODY --receive_frame--> DONE
//!                         |                     |
//!                         +------ timeout ------+-------------------> DONE
//! ```
//!
//! Each step either makes progress or returns immediately; nothing waits.
//! A step entered in any other state than the one it expects records
//! `ILLEGAL_STATE` and ends the transaction.

use core::fmt;

use tracing::{debug, trace, warn};

use crate::protocol::{Direction, ErrorFlags, Frame, MAX_FRAME_LEN, State, checksum};
use crate::transport::{BreakExit, Clock, SerialPort, elapsed_micros};

/// Buffers and timing of one in-flight transaction.
#[derive(Debug, Clone)]
pub(crate) struct FrameMachine {
    state: State,
    errors: ErrorFlags,
    break_exit: BreakExit,
    baudrate: u32,
    time_per_byte_us: u32,
    frame: Option<Frame>,
    tx: [u8; MAX_FRAME_LEN],
    len_tx: usize,
    rx: [u8; MAX_FRAME_LEN],
    len_rx: usize,
    rx_filled: usize,
    time_start: u32,
    time_start_break: u32,
    time_max_us: u32,
}

impl FrameMachine {
    pub(crate) fn new(break_exit: BreakExit) -> Self {
        Self {
            state: State::Idle,
            errors: ErrorFlags::new(),
            break_exit,
            baudrate: 0,
            time_per_byte_us: 0,
            frame: None,
            tx: [0u8; MAX_FRAME_LEN],
            len_tx: 0,
            rx: [0u8; MAX_FRAME_LEN],
            len_rx: 0,
            rx_filled: 0,
            time_start: 0,
            time_start_break: 0,
            time_max_us: 0,
        }
    }

    /// Set the nominal bit rate and the byte time derived from it.
    pub(crate) fn configure(&mut self, baudrate: u32, time_per_byte_us: u32) {
        self.baudrate = baudrate;
        self.time_per_byte_us = time_per_byte_us;
    }

    pub(crate) const fn state(&self) -> State {
        self.state
    }

    pub(crate) const fn errors(&self) -> ErrorFlags {
        self.errors
    }

    pub(crate) const fn time_max_us(&self) -> u32 {
        self.time_max_us
    }

    pub(crate) fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Bytes transmitted for the current frame, break placeholder included.
    pub(crate) fn tx_bytes(&self) -> &[u8] {
        &self.tx[..self.len_tx]
    }

    /// Bytes read back so far, break echo included.
    pub(crate) fn rx_bytes(&self) -> &[u8] {
        &self.rx[..self.rx_filled]
    }

    /// Validated data bytes, once the transaction finished without fault.
    pub(crate) fn payload(&self) -> Option<&[u8]> {
        if self.state != State::Done || !self.errors.is_ok() {
            return None;
        }
        let frame = self.frame.as_ref()?;
        Some(&self.rx[3..3 + frame.data_len()])
    }

    /// Force the machine back to `IDLE`, dropping any transaction in flight.
    pub(crate) fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// Prepare buffers for `frame`. Only valid in `IDLE`.
    pub(crate) fn load(&mut self, frame: &Frame, time_max_us: u32, clock: &impl Clock) {
        self.errors = ErrorFlags::new();
        self.len_tx = frame.encode_into(&mut self.tx);
        self.len_rx = frame.rx_len();
        self.rx = [0u8; MAX_FRAME_LEN];
        self.rx_filled = 0;
        self.time_max_us = time_max_us;
        self.time_start = clock.now_micros();
        self.frame = Some(frame.clone());
    }

    /// Record `flag` and end the transaction.
    pub(crate) fn fail(&mut self, flag: u8) -> State {
        self.errors.insert(flag);
        self.state = State::Done;
        self.state
    }

    fn fail_transport<E: fmt::Debug>(&mut self, port: &mut impl SerialPort, err: &E) -> State {
        warn!(error = ?err, state = %self.state, "serial port failure");
        Self::finish(port);
        self.fail(ErrorFlags::TRANSPORT)
    }

    fn illegal_state(&mut self, expected: State) -> State {
        warn!(state = %self.state, expected = %expected, "step entered in wrong state");
        self.fail(ErrorFlags::ILLEGAL_STATE)
    }

    fn check_timeout(&mut self, port: &mut impl SerialPort, clock: &impl Clock) -> State {
        let elapsed = elapsed_micros(clock.now_micros(), self.time_start);
        if elapsed > self.time_max_us {
            debug!(elapsed, max = self.time_max_us, state = %self.state, "transaction timed out");
            Self::finish(port);
            return self.fail(ErrorFlags::TIMEOUT);
        }
        self.state
    }

    /// Switch both activity indicators off.
    pub(crate) fn finish(port: &mut impl SerialPort) {
        port.indicate_tx(false);
        port.indicate_rx(false);
    }

    /// Advance by at most one transition.
    pub(crate) fn poll(&mut self, port: &mut impl SerialPort, clock: &impl Clock) -> State {
        match self.state {
            State::Break => self.send_frame(port, clock),
            State::Body => self.receive_frame(port, clock),
            State::Idle | State::Done => self.state,
        }
    }

    /// IDLE -> BREAK: clear the line and send the break at half rate.
    pub(crate) fn send_break(&mut self, port: &mut impl SerialPort, clock: &impl Clock) -> State {
        if self.state != State::Idle {
            return self.illegal_state(State::Idle);
        }

        port.indicate_tx(true);
        let result = port
            .flush()
            .and_then(|()| port.discard_input())
            .and_then(|()| port.set_baud_rate(self.baudrate / 2))
            .and_then(|()| port.send_break());
        if let Err(err) = result {
            return self.fail_transport(port, &err);
        }

        self.time_start_break = clock.now_micros();
        self.state = State::Break;
        trace!(baudrate = self.baudrate / 2, "break sent");
        self.state
    }

    fn break_finished<P: SerialPort>(
        &mut self,
        port: &mut P,
        clock: &impl Clock,
    ) -> Result<bool, P::Error> {
        match self.break_exit {
            BreakExit::Elapsed => {
                let elapsed = elapsed_micros(clock.now_micros(), self.time_start_break);
                Ok(elapsed > self.time_per_byte_us * 2)
            }
            BreakExit::Echo => {
                if port.bytes_available()? == 0 {
                    return Ok(false);
                }
                let read = port.read(&mut self.rx[..1])?;
                self.rx_filled += read;
                Ok(read == 1)
            }
        }
    }

    /// BREAK -> BODY: once the break is over, send the rest of the header
    /// (and the data and checksum of a master request) at nominal rate.
    pub(crate) fn send_frame(&mut self, port: &mut impl SerialPort, clock: &impl Clock) -> State {
        if self.state != State::Break {
            return self.illegal_state(State::Break);
        }

        match self.break_finished(port, clock) {
            Ok(true) => {}
            Ok(false) => return self.check_timeout(port, clock),
            Err(err) => return self.fail_transport(port, &err),
        }

        let result = port
            .set_baud_rate(self.baudrate)
            .and_then(|()| port.write(&self.tx[1..self.len_tx]));
        if let Err(err) = result {
            return self.fail_transport(port, &err);
        }

        port.indicate_tx(false);
        port.indicate_rx(true);
        self.state = State::Body;
        trace!(len = self.len_tx - 1, "header sent");
        self.state
    }

    /// BODY -> DONE: once every expected byte is available, read and
    /// validate the frame.
    pub(crate) fn receive_frame(
        &mut self,
        port: &mut impl SerialPort,
        clock: &impl Clock,
    ) -> State {
        if self.state != State::Body {
            return self.illegal_state(State::Body);
        }

        let remaining = self.len_rx - self.rx_filled;
        let available = match port.bytes_available() {
            Ok(available) => available,
            Err(err) => return self.fail_transport(port, &err),
        };
        if available >= remaining {
            match port.read(&mut self.rx[self.rx_filled..self.len_rx]) {
                Ok(read) => self.rx_filled += read,
                Err(err) => return self.fail_transport(port, &err),
            }
        }

        if self.rx_filled < self.len_rx {
            return self.check_timeout(port, clock);
        }

        let faults = self.check_frame();
        self.errors.insert(faults.as_u8());
        Self::finish(port);
        self.state = State::Done;
        trace!(rx = ?&self.rx[..self.len_rx], errors = %self.errors, "frame received");
        self.state
    }

    /// Compare the echo with what was sent and verify the slave checksum.
    fn check_frame(&self) -> ErrorFlags {
        let mut faults = ErrorFlags::new();
        let Some(frame) = self.frame.as_ref() else {
            return faults.with(ErrorFlags::ILLEGAL_STATE);
        };

        // break echo is not compared: it may arrive garbled after the
        // rate change
        if self.rx[1..self.len_tx] != self.tx[1..self.len_tx] {
            faults.insert(ErrorFlags::ECHO_MISMATCH);
        }

        if frame.direction() == Direction::MasterRead {
            let end = 3 + frame.data_len();
            if !checksum::verify(
                self.tx[2],
                &self.rx[3..end],
                frame.checksum_mode(),
                self.rx[end],
            ) {
                faults.insert(ErrorFlags::CHECKSUM_MISMATCH);
            }
        }
        faults
    }
}
