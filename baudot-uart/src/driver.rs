//! Buffered UART driver
//!
//! One [`Uart`] owns a register block handle, one receive ring and one
//! transmit ring. Mainline code produces into the transmit ring and
//! consumes from the receive ring; the two interrupt bodies do the
//! opposite. Any step that observes or moves a ring's index pair as a
//! unit runs inside `critical_section::with`, so a handler can never
//! see a torn update.
//!
//! Blocking is busy-waiting: `write_byte` spins on a full transmit
//! ring and `read_bytes` spins on an empty receive ring. The spins are
//! safe only because the interrupt expected to make progress stays
//! enabled throughout; if that interrupt source never fires, the spin
//! never terminates. That liveness hazard is part of the contract, not
//! something this driver papers over.

use core::cell::{Cell, RefCell};

use baudot_core::{BaudDivisor, Lifecycle, RingBuffer};
use critical_section::Mutex;

use crate::regs::{bits, Register, RegisterBlock};

/// Default depth of the receive and transmit rings.
pub const DEFAULT_BUFFER_SIZE: usize = 64;

/// Driver errors.
///
/// There is deliberately no error for a full transmit ring or a slow
/// receive peer: those conditions block instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// `start` was called while the driver was already running
    AlreadyRunning,
    /// `stop` was called while the driver was already stopped
    AlreadyStopped,
    /// A data operation was attempted while the driver was stopped
    Stopped,
}

/// Buffered, interrupt-driven UART.
///
/// Construction consumes the register block handle, so at most one
/// driver instance ever binds a given block. All methods take `&self`;
/// with a `Sync` register block the driver can live in a `static` and
/// be shared between mainline code and the interrupt vectors.
pub struct Uart<R, const N: usize = DEFAULT_BUFFER_SIZE> {
    regs: R,
    clock_hz: u32,
    state: Mutex<Cell<Lifecycle>>,
    rx: Mutex<RefCell<RingBuffer<N>>>,
    tx: Mutex<RefCell<RingBuffer<N>>>,
}

impl<R: RegisterBlock, const N: usize> Uart<R, N> {
    /// Bind a driver to a register block.
    ///
    /// `clock_hz` is the reference clock the baud divisor is derived
    /// from. The driver starts out `Stopped`; nothing is written to
    /// the registers until [`start`](Self::start).
    pub const fn new(regs: R, clock_hz: u32) -> Self {
        Self {
            regs,
            clock_hz,
            state: Mutex::new(Cell::new(Lifecycle::Stopped)),
            rx: Mutex::new(RefCell::new(RingBuffer::new())),
            tx: Mutex::new(RefCell::new(RingBuffer::new())),
        }
    }

    /// Access the underlying register block.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Configure the peripheral and arm the receive interrupt.
    ///
    /// Fails without touching a register when already running. Must
    /// not be called from an interrupt handler.
    pub fn start(&self, baudrate: u32) -> Result<(), Error> {
        self.transition(Lifecycle::start, Error::AlreadyRunning)?;

        self.regs.enable_interrupts();

        let baud = BaudDivisor::compute(self.clock_hz, baudrate);
        if baud.double_speed {
            self.regs.set_bits(Register::ControlA, bits::DOUBLE_SPEED);
        } else {
            self.regs.write(Register::ControlA, 0);
        }
        self.regs.write(Register::BaudHigh, baud.high());
        self.regs.write(Register::BaudLow, baud.low());

        // 8-bit frames; parity and stop bits stay at their defaults
        self.regs
            .set_bits(Register::ControlC, bits::CHAR_SIZE_1 | bits::CHAR_SIZE_0);
        self.regs.set_bits(
            Register::ControlB,
            bits::RX_ENABLE | bits::RX_IRQ | bits::TX_ENABLE,
        );
        Ok(())
    }

    /// Drain the transmitter, discard unread input and shut the
    /// peripheral down.
    ///
    /// Fails without touching a register when already stopped. Busy-
    /// waits until every queued byte has left the transmit ring, so it
    /// must not be called from an interrupt handler.
    pub fn stop(&self) -> Result<(), Error> {
        self.transition(Lifecycle::stop, Error::AlreadyStopped)?;

        while self.is_transmitting() {
            core::hint::spin_loop();
        }
        self.flush();

        self.regs.write(Register::BaudHigh, 0);
        self.regs.write(Register::BaudLow, 0);
        self.regs.write(Register::ControlA, 0);
        self.regs
            .clear_bits(Register::ControlC, bits::CHAR_SIZE_1 | bits::CHAR_SIZE_0);
        self.regs.clear_bits(
            Register::ControlB,
            bits::RX_ENABLE | bits::RX_IRQ | bits::TX_ENABLE | bits::TX_READY_IRQ,
        );
        Ok(())
    }

    /// Whether a transmission is pending.
    ///
    /// True while the transmit-ready interrupt is armed, which is the
    /// case from the first queued byte until the handler finds the
    /// transmit ring empty.
    pub fn is_transmitting(&self) -> bool {
        self.regs.read(Register::ControlB) & bits::TX_READY_IRQ != 0
    }

    /// Queue one byte for transmission.
    ///
    /// Spins while the transmit ring is full, then re-arms the
    /// transmit-ready interrupt (the handler disarms it whenever it
    /// finds the ring empty, so every write must re-arm). Fails fast
    /// with [`Error::Stopped`] when the driver is stopped, because the
    /// interrupt that would free a slot is not armed then.
    pub fn write_byte(&self, byte: u8) -> Result<(), Error> {
        self.ensure_running()?;

        loop {
            let pushed = critical_section::with(|cs| self.tx.borrow_ref_mut(cs).try_push(byte));
            if pushed {
                break;
            }
            core::hint::spin_loop();
        }
        self.regs.set_bits(Register::ControlB, bits::TX_READY_IRQ);
        Ok(())
    }

    /// Queue a slice for transmission, in order.
    ///
    /// No all-or-nothing guarantee: earlier bytes may already be on
    /// the wire before the call returns.
    pub fn write_bytes(&self, data: &[u8]) -> Result<(), Error> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Take the oldest received byte, or `0` when none is buffered.
    ///
    /// `0` is a sentinel, not an error: callers that need to tell "no
    /// data" from a genuine zero byte must consult
    /// [`available`](Self::available) first. Total in every state; a
    /// stopped driver simply has nothing buffered.
    pub fn read_byte(&self) -> u8 {
        critical_section::with(|cs| self.rx.borrow_ref_mut(cs).pop()).unwrap_or(0)
    }

    /// Fill `buf` from the receive ring, spinning until enough bytes
    /// have arrived.
    ///
    /// Fails fast with [`Error::Stopped`] when the driver is stopped;
    /// nothing can arrive then and the spin would never end.
    pub fn read_bytes(&self, buf: &mut [u8]) -> Result<(), Error> {
        self.ensure_running()?;

        for slot in buf.iter_mut() {
            while self.available() == 0 {
                core::hint::spin_loop();
            }
            *slot = self.read_byte();
        }
        Ok(())
    }

    /// Number of received bytes waiting to be read.
    pub fn available(&self) -> usize {
        critical_section::with(|cs| self.rx.borrow_ref(cs).len())
    }

    /// Number of bytes queued for transmission and not yet handed to
    /// the data register.
    pub fn tx_pending(&self) -> usize {
        critical_section::with(|cs| self.tx.borrow_ref(cs).len())
    }

    /// Discard every unread received byte.
    ///
    /// This is the historical serial-port `flush` and acts on the
    /// *receive* side. It is not [`embedded_io::Write::flush`], which
    /// waits for the transmit side to drain; with the `Write` trait in
    /// scope, method syntax still resolves here, so call that one as
    /// `Write::flush(&mut uart)`.
    pub fn flush(&self) {
        critical_section::with(|cs| self.rx.borrow_ref_mut(cs).clear());
    }

    /// Received bytes lost to ring overflow since construction.
    ///
    /// The receive handler never waits: when the ring is full the
    /// newest byte displaces the oldest unread one. The loss is silent
    /// on the data path and only observable here.
    pub fn rx_overruns(&self) -> u32 {
        critical_section::with(|cs| self.rx.borrow_ref(cs).overruns())
    }

    /// Receive-complete interrupt body.
    ///
    /// Platform glue must invoke this exactly once per receive event.
    pub fn on_receive(&self) {
        let byte = self.regs.read(Register::Data);
        critical_section::with(|cs| {
            self.rx.borrow_ref_mut(cs).push_overwriting(byte);
        });
    }

    /// Data-register-empty interrupt body.
    ///
    /// Sends the next queued byte, or disarms the transmit-ready
    /// interrupt when the ring is empty so the vector stops re-firing
    /// with nothing to send.
    pub fn on_transmit_ready(&self) {
        let next = critical_section::with(|cs| self.tx.borrow_ref_mut(cs).pop());
        match next {
            Some(byte) => self.regs.write(Register::Data, byte),
            None => self.regs.clear_bits(Register::ControlB, bits::TX_READY_IRQ),
        }
    }

    pub(crate) fn ensure_running(&self) -> Result<(), Error> {
        let running = critical_section::with(|cs| self.state.borrow(cs).get().is_running());
        if running {
            Ok(())
        } else {
            Err(Error::Stopped)
        }
    }

    fn transition(
        &self,
        apply: impl FnOnce(&mut Lifecycle) -> bool,
        already: Error,
    ) -> Result<(), Error> {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            if apply(&mut state) {
                cell.set(state);
                Ok(())
            } else {
                Err(already)
            }
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_start_programs_registers() {
        let uart = started_uart();
        let regs = uart.registers();

        assert!(regs.interrupts_enabled.get());
        // 9600 baud at 16 MHz: divisor 207, double-speed
        assert_eq!(regs.read(Register::ControlA), bits::DOUBLE_SPEED);
        assert_eq!(regs.read(Register::BaudHigh), 0);
        assert_eq!(regs.read(Register::BaudLow), 207);
        assert_eq!(
            regs.read(Register::ControlC),
            bits::CHAR_SIZE_1 | bits::CHAR_SIZE_0
        );
        assert_eq!(
            regs.read(Register::ControlB),
            bits::RX_ENABLE | bits::RX_IRQ | bits::TX_ENABLE
        );
    }

    #[test]
    fn test_start_low_baud_disables_double_speed() {
        let uart = Uart::<MockRegs>::new(MockRegs::new(), CLOCK_HZ);
        uart.start(300).unwrap();
        let regs = uart.registers();

        assert_eq!(regs.read(Register::ControlA), 0);
        assert_eq!(regs.read(Register::BaudHigh), 0x0D);
        assert_eq!(regs.read(Register::BaudLow), 0x04);
    }

    #[test]
    fn test_double_start_leaves_registers_untouched() {
        let uart = started_uart();
        let before = uart.registers().snapshot();

        assert_eq!(uart.start(115_200), Err(Error::AlreadyRunning));
        assert_eq!(uart.registers().snapshot(), before);
    }

    #[test]
    fn test_stop_while_stopped_is_rejected() {
        let uart = Uart::<MockRegs>::new(MockRegs::new(), CLOCK_HZ);
        assert_eq!(uart.stop(), Err(Error::AlreadyStopped));
        assert_eq!(uart.registers().snapshot(), [0; 6]);
    }

    #[test]
    fn test_stop_clears_configuration() {
        let uart = started_uart();
        uart.stop().unwrap();
        let regs = uart.registers();

        assert_eq!(regs.read(Register::BaudHigh), 0);
        assert_eq!(regs.read(Register::BaudLow), 0);
        assert_eq!(regs.read(Register::ControlA), 0);
        assert_eq!(regs.read(Register::ControlC), 0);
        assert_eq!(regs.read(Register::ControlB), 0);

        // And a restart works
        uart.start(9_600).unwrap();
        assert_eq!(regs.read(Register::BaudLow), 207);
    }

    #[test]
    fn test_write_drains_in_order() {
        let uart = started_uart();

        uart.write_bytes(&[0x41, 0x42, 0x43]).unwrap();
        assert!(uart.is_transmitting());

        uart.on_transmit_ready();
        uart.on_transmit_ready();
        uart.on_transmit_ready();
        assert_eq!(uart.registers().sent.borrow().as_slice(), b"ABC");

        // The ring is empty now; the next firing disarms the vector.
        assert!(uart.is_transmitting());
        uart.on_transmit_ready();
        assert!(!uart.is_transmitting());
        assert_eq!(uart.registers().sent.borrow().as_slice(), b"ABC");
    }

    #[test]
    fn test_end_to_end_write_then_stop() {
        let uart = started_uart();
        uart.write_bytes(&[0x41, 0x42, 0x43]).unwrap();
        drain_tx(&uart);

        uart.stop().unwrap();
        assert_eq!(uart.registers().sent.borrow().as_slice(), b"ABC");
        assert_eq!(uart.write_byte(0x44), Err(Error::Stopped));
        assert_eq!(uart.stop(), Err(Error::AlreadyStopped));
    }

    #[test]
    fn test_write_while_stopped_fails_fast() {
        let uart = Uart::<MockRegs>::new(MockRegs::new(), CLOCK_HZ);
        assert_eq!(uart.write_byte(0x41), Err(Error::Stopped));
        assert_eq!(uart.write_bytes(b"AB"), Err(Error::Stopped));
        let mut buf = [0u8; 2];
        assert_eq!(uart.read_bytes(&mut buf), Err(Error::Stopped));
    }

    #[test]
    fn test_receive_path() {
        let uart = started_uart();
        assert_eq!(uart.available(), 0);
        assert_eq!(uart.read_byte(), 0);

        receive(&uart, 0x5A);
        assert_eq!(uart.available(), 1);
        assert_eq!(uart.read_byte(), 0x5A);
        assert_eq!(uart.available(), 0);
        assert_eq!(uart.read_byte(), 0);
    }

    #[test]
    fn test_bulk_read() {
        let uart = started_uart();
        for byte in b"hello" {
            receive(&uart, *byte);
        }

        let mut buf = [0u8; 5];
        uart.read_bytes(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        assert_eq!(uart.available(), 0);
    }

    #[test]
    fn test_flush_discards_unread_input() {
        let uart = started_uart();
        receive(&uart, 1);
        receive(&uart, 2);
        uart.flush();
        assert_eq!(uart.available(), 0);
        assert_eq!(uart.read_byte(), 0);
    }

    #[test]
    fn test_rx_overflow_drops_oldest() {
        let uart = started_uart();
        // The default ring holds 63 bytes; the 64th delivery displaces
        // the oldest unread byte.
        for i in 0..64u8 {
            receive(&uart, i);
        }
        assert_eq!(uart.available(), 63);
        assert_eq!(uart.rx_overruns(), 1);
        assert_eq!(uart.read_byte(), 1);
    }

    #[test]
    fn test_stop_discards_unread_input() {
        let uart = started_uart();
        receive(&uart, 0x99);
        uart.stop().unwrap();
        assert_eq!(uart.available(), 0);
        assert_eq!(uart.read_byte(), 0);
    }
}
