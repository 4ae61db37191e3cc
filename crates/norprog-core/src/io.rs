//! Collaborator traits for register access and timekeeping
//!
//! The program driver never touches hardware directly. Everything it does
//! goes through these two traits, issued in a fixed order, so a backend only
//! has to provide raw word access and a microsecond counter.

/// Address of a register or memory cell in the flash's address space
pub type Address = u32;

/// Unit of data transfer, also the width of the status register
pub type Word = u16;

/// Raw word access to a memory-mapped flash device
///
/// Every call is a bus transaction with side effects on the device. Callers
/// must not reorder, merge or elide them.
pub trait RegisterIo {
    /// Read a word from the given address
    fn read(&mut self, addr: Address) -> Word;

    /// Write a word to the given address
    fn write(&mut self, addr: Address, value: Word);
}

/// Monotonic microsecond counter that wraps modulo 2^32
pub trait TimeSource {
    /// Current counter value in microseconds
    fn now_us(&mut self) -> u32;

    /// Microseconds elapsed since `since`
    ///
    /// Uses modulo 2^32 subtraction, so a start value just below `u32::MAX`
    /// followed by a reading that wrapped past zero still yields the true
    /// elapsed time.
    fn elapsed_us(&mut self, since: u32) -> u32 {
        self.now_us().wrapping_sub(since)
    }

    /// Wait for the given number of microseconds
    ///
    /// Only called between status polls when a poll delay is configured.
    /// The default implementation returns immediately.
    fn delay_us(&mut self, _us: u32) {}
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn read(&mut self, addr: Address) -> Word {
        (**self).read(addr)
    }

    fn write(&mut self, addr: Address, value: Word) {
        (**self).write(addr, value)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &mut T {
    fn now_us(&mut self) -> u32 {
        (**self).now_us()
    }

    fn elapsed_us(&mut self, since: u32) -> u32 {
        (**self).elapsed_us(since)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}
