//! Serial transport seam for the LIN master
//!
//! The driver only talks to the wire through [`SerialPort`] and reads time
//! through [`Clock`]. Hardware-specific behaviour that affects protocol
//! timing is selected with [`BreakExit`].

mod clock;
mod loopback;
mod serial;
mod timing;

pub use clock::{Clock, ManualClock, SystemClock, elapsed_micros};
pub use loopback::{LoopbackBus, LoopbackError};
pub use serial::SerialPort;
pub use timing::BreakExit;
