//! Platform timing policy for leaving the break phase.

use std::fmt;

/// How the state machine decides that the break has finished.
///
/// Most UARTs report the echoed break byte as soon as it arrives, so the
/// machine can simply wait for it. Some peripherals report received bytes
/// more than a millisecond late; waiting for the echo there would stall
/// the header, so the machine instead waits for the break's own duration
/// (two byte-times at nominal rate) and collects the break echo together
/// with the rest of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BreakExit {
    /// Wait until the break echo byte is available, then consume it.
    #[default]
    Echo,
    /// Wait until more than two byte-times have elapsed since the break.
    Elapsed,
}

impl fmt::Display for BreakExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Echo => write!(f, "echo"),
            Self::Elapsed => write!(f, "elapsed"),
        }
    }
}
