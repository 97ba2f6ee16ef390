//! Register access seam
//!
//! The driver never touches memory-mapped registers directly; it goes
//! through [`RegisterBlock`] so the lifecycle and buffer logic can be
//! exercised without real hardware. A platform implementation maps
//! each [`Register`] to the corresponding peripheral address and makes
//! every access a single volatile read or write.

/// The six registers a UART instance is bound to for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// High byte of the baud divisor
    BaudHigh,
    /// Low byte of the baud divisor
    BaudLow,
    /// Status/control register A (double-speed mode)
    ControlA,
    /// Status/control register B (enables and interrupt masks)
    ControlB,
    /// Control register C (frame format)
    ControlC,
    /// Data register, shared by both transfer directions
    Data,
}

/// Bit assignments within the control registers.
pub mod bits {
    /// ControlA: double-speed mode
    pub const DOUBLE_SPEED: u8 = 1 << 1;

    /// ControlB: transmitter enable
    pub const TX_ENABLE: u8 = 1 << 3;
    /// ControlB: receiver enable
    pub const RX_ENABLE: u8 = 1 << 4;
    /// ControlB: "data register empty" interrupt enable. Doubles as
    /// the "transmission pending" flag: it is set while the TX buffer
    /// holds bytes or a byte is in flight, and cleared by the handler
    /// once the buffer runs dry.
    pub const TX_READY_IRQ: u8 = 1 << 5;
    /// ControlB: "receive complete" interrupt enable
    pub const RX_IRQ: u8 = 1 << 7;

    /// ControlC: character size, low bit
    pub const CHAR_SIZE_0: u8 = 1 << 1;
    /// ControlC: character size, high bit (together with
    /// [`CHAR_SIZE_0`] selects 8-bit frames)
    pub const CHAR_SIZE_1: u8 = 1 << 2;
}

/// Byte-wide access to a UART register block.
///
/// Implementations must be callable from both mainline and interrupt
/// context; the driver never issues more than one access per call.
pub trait RegisterBlock {
    /// Read a register.
    fn read(&self, reg: Register) -> u8;

    /// Write a register.
    fn write(&self, reg: Register, value: u8);

    /// Enable the global interrupt mechanism (the platform `sei`).
    /// Called once while starting the driver.
    fn enable_interrupts(&self);

    /// Read-modify-write a register.
    fn modify(&self, reg: Register, f: impl FnOnce(u8) -> u8) {
        self.write(reg, f(self.read(reg)));
    }

    /// Set the bits of `mask` in a register.
    fn set_bits(&self, reg: Register, mask: u8) {
        self.modify(reg, |v| v | mask);
    }

    /// Clear the bits of `mask` in a register.
    fn clear_bits(&self, reg: Register, mask: u8) {
        self.modify(reg, |v| v & !mask);
    }
}
