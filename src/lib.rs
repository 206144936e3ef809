//! LIN (Local Interconnect Network) bus master driver
//!
//! This library runs the master side of LIN transactions over any
//! half-duplex serial port: it sends the break at half baud rate, transmits
//! the header (and data for master requests), reads back its own echo,
//! collects slave responses, and validates echo and checksum. Every step is
//! non-blocking; the caller drives progress by polling.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lin_master::{ChecksumMode, LinMaster, MasterConfig, State};
//! use lin_master::transport::{LoopbackBus, ManualClock};
//!
//! let clock = ManualClock::new(0);
//! let mut bus = LoopbackBus::new(clock.clone());
//! bus.respond(0x10, &[0x12, 0x34], ChecksumMode::Enhanced)?;
//!
//! let mut master = LinMaster::new(bus, clock, MasterConfig::default());
//! master.begin()?;
//! master.receive_slave_response(0x10, 2, ChecksumMode::Enhanced)?;
//!
//! while master.poll() != State::Done {}
//!
//! let response = master.result().expect("transaction finished");
//! assert_eq!(response.payload, Some(&[0x12, 0x34][..]));
//! # Ok::<(), lin_master::Error>(())
//! ```
//!
//! # Features
//!
//! - **Non-blocking** - one state transition per `poll()`, no threads, no sleeps
//! - **Echo checking** - every transmitted byte is compared with its read-back
//! - **Classic and enhanced checksums** - selected per frame
//! - **Platform timing policy** - break end detected by echo or by elapsed time
//! - **Accumulated fault flags** - the result lists every fault observed

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod master;
pub mod protocol;
pub mod transport;

pub use master::{LinMaster, MasterConfig, MasterStats, Response};
pub use protocol::{
    ChecksumMode, Direction, Error, ErrorFlags, Frame, MAX_DATA_LEN, MAX_IDENTIFIER, ProtectedId,
    Result, SYNC_BYTE, State, verify_protected_identifier,
};
pub use transport::{BreakExit, Clock, SerialPort};

/// LIN protocol revision whose framing and checksum rules are implemented
pub const LIN_VERSION: &str = "2.2A";
