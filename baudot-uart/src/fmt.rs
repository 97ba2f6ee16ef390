//! Text convenience layer
//!
//! Thin helpers over the byte API for human-readable output. Decimal
//! rendering is delegated to `core::fmt`, which produces digit
//! sequences with no leading zeros and a leading `-` for negative
//! values. Everything here ends up in the transmit ring through the
//! same blocking [`Uart::write_bytes`] path as raw bytes.

use core::fmt::{self, Write as _};

use crate::driver::{Error, Uart};
use crate::regs::RegisterBlock;

/// Handle to a string constant kept in read-only program memory.
///
/// On targets with a unified address space this is nothing more than a
/// `&'static str`; the wrapper keeps call sites explicit about where
/// the data lives, and gives flash-resident strings a distinct type at
/// the print surface.
#[derive(Debug, Clone, Copy)]
pub struct FlashStr(&'static str);

impl FlashStr {
    pub const fn new(s: &'static str) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Adapter routing `core::fmt` output into the transmit ring.
struct Printer<'a, R, const N: usize> {
    uart: &'a Uart<R, N>,
}

impl<R: RegisterBlock, const N: usize> fmt::Write for Printer<'_, R, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        // The only way a write can fail is a stopped driver; the
        // surface methods below translate the error back.
        self.uart.write_bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl<R: RegisterBlock, const N: usize> Uart<R, N> {
    /// Queue formatted text for transmission.
    ///
    /// ```ignore
    /// uart.print(format_args!("t = {} ms", elapsed))?;
    /// ```
    pub fn print(&self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        let mut printer = Printer { uart: self };
        printer.write_fmt(args).map_err(|_| Error::Stopped)
    }

    /// Queue formatted text followed by a newline.
    pub fn println(&self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        self.print(args)?;
        self.newline()
    }

    /// Queue a string slice for transmission.
    pub fn print_str(&self, s: &str) -> Result<(), Error> {
        self.write_bytes(s.as_bytes())
    }

    /// Queue a flash-resident string for transmission.
    pub fn print_flash(&self, s: FlashStr) -> Result<(), Error> {
        self.print_str(s.as_str())
    }

    /// Queue a bare newline.
    pub fn newline(&self) -> Result<(), Error> {
        self.write_byte(b'\n')
    }
}
