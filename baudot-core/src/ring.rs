//! Fixed-capacity circular byte buffer
//!
//! Two of these back every UART instance: one filled by the receive
//! interrupt and drained by the application, one filled by the
//! application and drained by the transmit interrupt. Exactly one
//! context writes at `head` and exactly one reads at `tail`; callers
//! that need to observe or move both indices as a unit must do so
//! inside a critical section.
//!
//! `head` is the next write slot and `tail` the next read slot; the
//! buffer is empty when they are equal. That encoding leaves `N - 1`
//! usable slots, the usual price for an index-only ring.

/// Circular byte queue with `N - 1` usable slots.
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    /// Next write slot
    head: usize,
    /// Next read slot
    tail: usize,
    /// Bytes lost to overwriting pushes, monotonically increasing
    overruns: u32,
}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty buffer. `const` so a driver holding two of
    /// these can live in a `static`.
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
            overruns: 0,
        }
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        (N + self.head - self.tail) % N
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        (self.head + 1) % N == self.tail
    }

    /// Usable capacity. One slot is sacrificed to keep "empty"
    /// distinguishable from "full".
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Append a byte, refusing when the buffer is full.
    ///
    /// Returns `true` when the byte was stored. This is the transmit
    /// producer path; what to do about a full buffer (spin, fail, ...)
    /// is the caller's policy.
    pub fn try_push(&mut self, byte: u8) -> bool {
        let next = (self.head + 1) % N;
        if next == self.tail {
            return false;
        }
        self.buf[self.head] = byte;
        self.head = next;
        true
    }

    /// Append a byte, dropping the oldest unread byte when full.
    ///
    /// This is the receive producer path: the interrupt handler must
    /// never wait, so on overflow the newest byte displaces the oldest
    /// and the loss is counted. Returns `true` when an unread byte was
    /// lost. The buffer never reports fewer than `N - 1` unread bytes
    /// because of an overflow.
    pub fn push_overwriting(&mut self, byte: u8) -> bool {
        let overflowed = self.is_full();
        if overflowed {
            self.tail = (self.tail + 1) % N;
            self.overruns = self.overruns.wrapping_add(1);
        }
        self.buf[self.head] = byte;
        self.head = (self.head + 1) % N;
        overflowed
    }

    /// Remove and return the oldest unread byte.
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buf[self.tail];
        self.tail = (self.tail + 1) % N;
        Some(byte)
    }

    /// Discard every unread byte without reading it.
    pub fn clear(&mut self) {
        self.tail = self.head;
    }

    /// Total bytes lost to overwriting pushes since creation.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
