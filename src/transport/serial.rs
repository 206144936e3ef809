//! Serial port capabilities required by the LIN master.

use core::fmt;

use crate::protocol::BREAK_BYTE;

/// Byte-level access to a half-duplex serial channel.
///
/// Implemented by whatever moves bytes on the wire: a hardware UART, a
/// bit-banged software UART, or a simulation. None of the methods may block
/// waiting for the bus; the state machine polls instead.
pub trait SerialPort {
    /// Failure reported by the port.
    type Error: fmt::Debug;

    /// Open the port at the given rate.
    fn open(&mut self, baudrate: u32) -> Result<(), Self::Error> {
        self.set_baud_rate(baudrate)
    }

    /// Close the port.
    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Change the bit rate.
    fn set_baud_rate(&mut self, baudrate: u32) -> Result<(), Self::Error>;

    /// Wait until pending output has left the transmitter.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Drop everything already received.
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        let mut scratch = [0u8; 1];
        while self.bytes_available()? > 0 {
            if self.read(&mut scratch)? == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Drive the line low for the break.
    ///
    /// The caller has already halved the bit rate, so a single zero byte
    /// (start bit plus eight data bits) spans 18 nominal bit-times.
    fn send_break(&mut self) -> Result<(), Self::Error> {
        self.write(&[BREAK_BYTE])
    }

    /// Queue bytes for transmission.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Number of received bytes ready to read.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read up to `buf.len()` received bytes, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Transmit activity indicator (e.g. an LED).
    fn indicate_tx(&mut self, _active: bool) {}

    /// Receive activity indicator (e.g. an LED).
    fn indicate_rx(&mut self, _active: bool) {}
}

impl<T: SerialPort + ?Sized> SerialPort for &mut T {
    type Error = T::Error;

    fn open(&mut self, baudrate: u32) -> Result<(), Self::Error> {
        (**self).open(baudrate)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        (**self).close()
    }

    fn set_baud_rate(&mut self, baudrate: u32) -> Result<(), Self::Error> {
        (**self).set_baud_rate(baudrate)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }

    fn discard_input(&mut self) -> Result<(), Self::Error> {
        (**self).discard_input()
    }

    fn send_break(&mut self) -> Result<(), Self::Error> {
        (**self).send_break()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(bytes)
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        (**self).bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }

    fn indicate_tx(&mut self, active: bool) {
        (**self).indicate_tx(active);
    }

    fn indicate_rx(&mut self, active: bool) {
        (**self).indicate_rx(active);
    }
}
