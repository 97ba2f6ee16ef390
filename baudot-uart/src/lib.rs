//! Interrupt-driven buffered UART driver
//!
//! The application side sees byte-oriented reads and writes; the
//! actual transfer happens in two interrupt handlers that share a pair
//! of circular buffers with mainline code:
//!
//! ```text
//! application ──write──▶ TX ring ──on_transmit_ready──▶ data register
//! application ◀──read─── RX ring ◀───────on_receive─── data register
//! ```
//!
//! Register access goes through the [`regs::RegisterBlock`] trait so
//! the lifecycle and buffer logic can run against a mock block on the
//! host. Platform glue is expected to route the receive-complete and
//! data-register-empty vectors to [`Uart::on_receive`] and
//! [`Uart::on_transmit_ready`], exactly once per hardware event.

#![no_std]
#![deny(unsafe_code)]

pub mod driver;
pub mod fmt;
pub mod io;
pub mod regs;

// Re-export key types at crate root for convenience
pub use driver::{Error, Uart};
pub use fmt::FlashStr;
pub use regs::{Register, RegisterBlock};
