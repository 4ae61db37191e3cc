//! Single word program and verify
//!
//! This module implements the vendor program algorithm for one word:
//!
//! ```text
//! start = now
//! CMD  <- PROGRAM
//! addr <- value
//! loop {
//!     status <- SR
//!     if READY { break }
//!     if elapsed(start) >= timeout { return Timeout }
//! }
//! classify(status):
//!     error -> CMD <- RESET, return error
//!     ready -> addr == value ? Ok : ReadBackError
//! ```
//!
//! A timeout does not reset the device and neither does a read-back
//! mismatch; only an error reported through the status register does. There
//! is no retry: each call performs exactly one program attempt.

use crate::device::DeviceLayout;
use crate::error::{Error, Result};
use crate::io::{Address, RegisterIo, TimeSource, Word};
use crate::status::{StatusClass, StatusFlags};

/// Default program timeout in microseconds
pub const DEFAULT_TIMEOUT_US: u32 = 5_000;

/// Timing parameters for a word program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgramConfig {
    /// Give up once this many microseconds have passed without ready
    pub timeout_us: u32,
    /// Delay between status polls, 0 to busy-poll
    #[cfg_attr(feature = "std", serde(default))]
    pub poll_delay_us: u32,
}

impl ProgramConfig {
    /// Create a configuration with the given timeout and no poll delay
    pub const fn new(timeout_us: u32) -> Self {
        Self {
            timeout_us,
            poll_delay_us: 0,
        }
    }

    /// Set the program timeout
    pub const fn with_timeout_us(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    /// Set the delay between status polls
    pub const fn with_poll_delay_us(mut self, poll_delay_us: u32) -> Self {
        self.poll_delay_us = poll_delay_us;
        self
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_US)
    }
}

/// Program a single word and verify it
///
/// Issues the program sequence described in the module documentation
/// against `io`, bounded in time by `clock`. Every exit is either `Ok(())`
/// or one of the [`Error`] variants; the call never blocks longer than the
/// configured timeout plus one poll.
///
/// # Errors
/// * `Timeout` - Ready was not observed within `config.timeout_us`
/// * `VppError`, `ProgramError`, `ProtectedBlockError`,
///   `UnknownProgramError` - The device flagged an error; a reset command
///   has been written
/// * `ReadBackError` - The device reported success but the read-back
///   differs from `value`
pub fn write_word<IO, T>(
    io: &mut IO,
    clock: &mut T,
    layout: &DeviceLayout,
    config: &ProgramConfig,
    address: Address,
    value: Word,
) -> Result<()>
where
    IO: RegisterIo + ?Sized,
    T: TimeSource + ?Sized,
{
    log::debug!("Programming 0x{:04X} at 0x{:08X}", value, address);

    let start = clock.now_us();
    io.write(layout.command_register, layout.program_command);
    io.write(address, value);

    let status = wait_ready(io, clock, layout, config, start)?;

    if let StatusClass::Failed(err) = status.classify() {
        log::warn!(
            "Program at 0x{:08X} failed (status {:?}): {}",
            address,
            status,
            err
        );
        io.write(layout.command_register, layout.reset_command);
        return Err(err);
    }

    let found = io.read(address);
    if found != value {
        log::warn!(
            "Read back mismatch at 0x{:08X}: wrote 0x{:04X}, read 0x{:04X}",
            address,
            value,
            found
        );
        return Err(Error::ReadBackError {
            address,
            expected: value,
            found,
        });
    }

    log::debug!("Programmed 0x{:08X}", address);
    Ok(())
}

/// Poll the status register until ready or until the timeout expires
///
/// Returns the decoded status that had ready set. Flags other than ready
/// are not looked at while the device is busy.
fn wait_ready<IO, T>(
    io: &mut IO,
    clock: &mut T,
    layout: &DeviceLayout,
    config: &ProgramConfig,
    start: u32,
) -> Result<StatusFlags>
where
    IO: RegisterIo + ?Sized,
    T: TimeSource + ?Sized,
{
    let mut polls: u32 = 0;

    loop {
        let raw = io.read(layout.status_register);
        polls = polls.saturating_add(1);

        let status = layout.status_bits.decode(raw);
        if status.is_ready() {
            log::trace!("Ready after {} polls (status 0x{:04X})", polls, raw);
            return Ok(status);
        }

        let elapsed = clock.elapsed_us(start);
        if elapsed >= config.timeout_us {
            log::warn!(
                "Timed out after {}us ({} polls, last status 0x{:04X})",
                elapsed,
                polls,
                raw
            );
            return Err(Error::Timeout);
        }

        if config.poll_delay_us > 0 {
            clock.delay_us(config.poll_delay_us);
        }
    }
}

/// A flash device together with the collaborators needed to program it
///
/// Holds no state between calls: two identical writes against a device in
/// the same condition issue identical bus sequences.
#[derive(Debug)]
pub struct FlashProgrammer<IO, T> {
    io: IO,
    clock: T,
    layout: DeviceLayout,
    config: ProgramConfig,
}

impl<IO: RegisterIo, T: TimeSource> FlashProgrammer<IO, T> {
    /// Create a programmer from its collaborators
    pub fn new(io: IO, clock: T, layout: DeviceLayout, config: ProgramConfig) -> Self {
        Self {
            io,
            clock,
            layout,
            config,
        }
    }

    /// Program a single word and verify it
    ///
    /// See [`write_word`].
    pub fn write(&mut self, address: Address, value: Word) -> Result<()> {
        write_word(
            &mut self.io,
            &mut self.clock,
            &self.layout,
            &self.config,
            address,
            value,
        )
    }

    /// Get the register I/O backend
    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Get the register I/O backend mutably
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Get the time source mutably
    pub fn clock_mut(&mut self) -> &mut T {
        &mut self.clock
    }

    /// Get the device layout
    pub fn layout(&self) -> &DeviceLayout {
        &self.layout
    }

    /// Get the timing configuration
    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    /// Release the collaborators
    pub fn into_parts(self) -> (IO, T) {
        (self.io, self.clock)
    }
}
