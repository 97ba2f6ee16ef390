//! Hardware-independent core logic for the Baudot UART driver
//!
//! This crate contains the pieces of the driver that need no register
//! access and can be exercised entirely on the host:
//!
//! - Circular byte buffers shared between interrupt and mainline code
//! - Baud-rate divisor selection
//! - The driver lifecycle state machine

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod baud;
pub mod lifecycle;
pub mod ring;

// Re-export key types at crate root for convenience
pub use baud::BaudDivisor;
pub use lifecycle::Lifecycle;
pub use ring::RingBuffer;
