//! LIN master driver
//!
//! [`LinMaster`] owns the serial port and runs one transaction at a time
//! through a non-blocking state machine advanced by [`LinMaster::poll`].

mod config;
mod controller;
mod machine;
mod stats;

pub use config::{
    BITS_PER_BYTE, DEFAULT_BAUDRATE, DEFAULT_TIMEOUT_MARGIN_PERCENT,
    LAGGING_UART_AVAILABILITY_LAG_US, MasterConfig,
};
pub use controller::{LinMaster, Response};
pub use stats::MasterStats;
