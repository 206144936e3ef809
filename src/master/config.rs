//! Master configuration and derived bus timing.

use crate::transport::BreakExit;

/// UART bits per byte on a LIN bus (start + 8 data + stop).
pub const BITS_PER_BYTE: u32 = 10;

/// Default bit rate.
pub const DEFAULT_BAUDRATE: u32 = 19_200;

/// LIN allows a frame to take 40% longer than nominal.
pub const DEFAULT_TIMEOUT_MARGIN_PERCENT: u32 = 140;

/// Reporting delay assumed for UARTs whose byte-available signal lags.
pub const LAGGING_UART_AVAILABILITY_LAG_US: u32 = 2_000;

/// Master configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MasterConfig {
    /// Node name attached to log events.
    pub name: String,
    /// Nominal bit rate in baud.
    pub baudrate: u32,
    /// How the end of the break is detected.
    pub break_exit: BreakExit,
    /// Transaction timeout as a percentage of the nominal frame time.
    pub timeout_margin_percent: u32,
    /// Delay between a byte arriving and the port reporting it, added to
    /// the transaction deadline.
    pub availability_lag_us: u32,
    /// Fixed transaction timeout in microseconds, overriding the margin.
    pub timeout_us: Option<u32>,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            name: "LIN".to_string(),
            baudrate: DEFAULT_BAUDRATE,
            break_exit: BreakExit::Echo,
            timeout_margin_percent: DEFAULT_TIMEOUT_MARGIN_PERCENT,
            availability_lag_us: 0,
            timeout_us: None,
        }
    }
}

impl MasterConfig {
    /// Defaults for a hardware UART that reports received bytes promptly.
    #[must_use]
    pub fn hardware_uart(name: impl Into<String>, baudrate: u32) -> Self {
        Self {
            name: name.into(),
            baudrate,
            ..Self::default()
        }
    }

    /// Defaults for a bit-banged software UART.
    ///
    /// Received bytes are visible as soon as the last stop bit is sampled,
    /// so the break echo can be waited for.
    #[must_use]
    pub fn software_uart(name: impl Into<String>, baudrate: u32) -> Self {
        Self::hardware_uart(name, baudrate)
    }

    /// Defaults for a UART whose byte-available signal lags real arrival
    /// by a millisecond or more.
    #[must_use]
    pub fn lagging_uart(name: impl Into<String>, baudrate: u32) -> Self {
        Self {
            name: name.into(),
            baudrate,
            break_exit: BreakExit::Elapsed,
            availability_lag_us: LAGGING_UART_AVAILABILITY_LAG_US,
            ..Self::default()
        }
    }

    /// Duration of one byte on the wire at the configured rate.
    ///
    /// Returns `None` for a zero bit rate.
    #[must_use]
    pub fn time_per_byte_us(&self) -> Option<u32> {
        (BITS_PER_BYTE * 1_000_000).checked_div(self.baudrate)
    }

    /// Deadline for a transaction that reads back `rx_len` bytes.
    ///
    /// `rx_len` includes the break echo; one extra byte-time accounts for
    /// the break being sent at half rate. The last byte may be reported
    /// `availability_lag_us` after it arrived, so the lag is added on top.
    #[must_use]
    pub fn transaction_timeout_us(&self, time_per_byte_us: u32, rx_len: usize) -> u32 {
        if let Some(fixed) = self.timeout_us {
            return fixed;
        }
        let bytes = u32::try_from(rx_len + 1).unwrap_or(u32::MAX);
        let nominal = u64::from(time_per_byte_us) * u64::from(bytes);
        let timeout = nominal * u64::from(self.timeout_margin_percent) / 100
            + u64::from(self.availability_lag_us);
        u32::try_from(timeout).unwrap_or(u32::MAX)
    }
}
