//! `embedded-io` adapters
//!
//! Lets the driver slot into generic code written against
//! `embedded_io::{Read, Write}`. The mapping keeps the driver's
//! blocking semantics: `read` parks until at least one byte is
//! buffered, `write` parks until the whole slice has been queued, so
//! the returned counts never surprise a caller.
//!
//! Note the flush mismatch: the driver's own [`Uart::flush`] discards
//! unread *input* (its historical meaning), while
//! [`embedded_io::Write::flush`] here waits for the *output* side to
//! drain.

use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write, WriteReady};

use crate::driver::{Error, Uart};
use crate::regs::RegisterBlock;

impl embedded_io::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::Stopped | Error::AlreadyStopped => ErrorKind::NotConnected,
            Error::AlreadyRunning => ErrorKind::Other,
        }
    }
}

impl<R: RegisterBlock, const N: usize> ErrorType for Uart<R, N> {
    type Error = Error;
}

impl<R: RegisterBlock, const N: usize> Read for Uart<R, N> {
    /// Block until at least one byte is buffered, then drain up to
    /// `buf.len()` bytes without further waiting.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.ensure_running()?;

        while self.available() == 0 {
            core::hint::spin_loop();
        }

        let mut count = 0;
        while count < buf.len() && self.available() > 0 {
            buf[count] = self.read_byte();
            count += 1;
        }
        Ok(count)
    }
}

impl<R: RegisterBlock, const N: usize> ReadReady for Uart<R, N> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.available() > 0)
    }
}

impl<R: RegisterBlock, const N: usize> Write for Uart<R, N> {
    /// Queue the whole slice, blocking on a full transmit ring.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    /// Busy-wait until the transmit side has fully drained.
    fn flush(&mut self) -> Result<(), Self::Error> {
        self.ensure_running()?;
        while self.is_transmitting() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

impl<R: RegisterBlock, const N: usize> WriteReady for Uart<R, N> {
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        // Writes only park on a full transmit ring
        Ok(self.tx_pending() < N - 1)
    }
}
