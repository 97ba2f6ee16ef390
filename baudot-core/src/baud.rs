//! Baud-rate divisor selection
//!
//! The peripheral derives its bit clock from the reference clock
//! through a 12-bit divisor. Two formulas are available: a double-speed
//! one with finer timing granularity and a normal-speed one that
//! reaches lower baud rates. The double-speed formula is preferred and
//! abandoned only when its result no longer fits the divisor field.

/// Widest value the 12-bit divisor field can hold.
pub const DIVISOR_MAX: u16 = 0x0FFF;

/// A divisor choice ready to be programmed into the baud registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaudDivisor {
    /// Value split across the baud-high / baud-low registers
    pub divisor: u16,
    /// Whether the double-speed mode bit must be set
    pub double_speed: bool,
}

impl BaudDivisor {
    /// Pick the divisor for a requested baud rate.
    ///
    /// All arithmetic is integer, so the achieved rate carries the
    /// usual quantization error. A normal-speed divisor that still
    /// exceeds 12 bits is kept truncated, exactly as the hardware
    /// register would truncate it. `baudrate` must be non-zero.
    pub fn compute(clock_hz: u32, baudrate: u32) -> Self {
        debug_assert!(baudrate > 0);

        let fine = (clock_hz / 4 / baudrate).saturating_sub(1) / 2;
        if fine > DIVISOR_MAX as u32 {
            let coarse = (clock_hz / 8 / baudrate).saturating_sub(1) / 2;
            Self {
                divisor: coarse as u16,
                double_speed: false,
            }
        } else {
            Self {
                divisor: fine as u16,
                double_speed: true,
            }
        }
    }

    /// Byte for the baud-high register.
    pub fn high(&self) -> u8 {
        (self.divisor >> 8) as u8
    }

    /// Byte for the baud-low register.
    pub fn low(&self) -> u8 {
        self.divisor as u8
    }
}
