//! In-memory NOR flash emulator
//!
//! [`DummyNor`] answers the command set the program driver uses, so the
//! driver can be run end to end without a scripted bus. Cells start erased
//! (all ones) and programming can only clear bits. Only programmed cells are
//! stored, in a fixed capacity table.

use heapless::{LinearMap, Vec};
use norprog_core::device::DeviceLayout;
use norprog_core::io::{Address, RegisterIo, Word};
use norprog_core::status::StatusFlags;

/// Value of an erased cell
pub const ERASED: Word = 0xFFFF;

/// Maximum number of distinct programmed cells
pub const MAX_CELLS: usize = 64;

/// Maximum number of protected ranges
pub const MAX_PROTECTED: usize = 4;

/// Configuration for the emulated device
#[derive(Debug, Clone, Copy)]
pub struct DummyConfig {
    /// Register layout the emulator decodes commands and encodes status with
    pub layout: DeviceLayout,
    /// Status reads that report busy after each program
    pub busy_polls: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            layout: DeviceLayout::m28w160ect(),
            busy_polls: 0,
        }
    }
}

/// Bus state of the emulated device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Reads return array contents
    ReadArray,
    /// Next data write programs a cell
    ProgramSetup,
    /// Reads of the status register return status
    ReadStatus,
}

/// Emulated NOR flash device
#[derive(Debug)]
pub struct DummyNor {
    config: DummyConfig,
    cells: LinearMap<Address, Word, MAX_CELLS>,
    protected: Vec<(Address, Address), MAX_PROTECTED>,
    mode: Mode,
    status: StatusFlags,
    busy_remaining: u32,
    vpp_low: bool,
    pending_error: StatusFlags,
    program_count: u32,
    reset_count: u32,
    status_reads: u32,
}

impl DummyNor {
    /// Create an erased device
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            cells: LinearMap::new(),
            protected: Vec::new(),
            mode: Mode::ReadArray,
            status: StatusFlags::empty(),
            busy_remaining: 0,
            vpp_low: false,
            pending_error: StatusFlags::empty(),
            program_count: 0,
            reset_count: 0,
            status_reads: 0,
        }
    }

    /// Create an erased M28W160ECT with no busy time
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Current contents of a cell, bypassing the bus
    pub fn cell(&self, addr: Address) -> Word {
        self.cells.get(&addr).copied().unwrap_or(ERASED)
    }

    /// Change how many busy status reads follow each program
    pub fn set_busy_polls(&mut self, polls: u32) {
        self.config.busy_polls = polls;
    }

    /// Simulate the programming voltage dropping out of range
    pub fn set_vpp_low(&mut self, low: bool) {
        self.vpp_low = low;
    }

    /// Report `flags` in the status of the next program, once
    pub fn inject_error(&mut self, flags: StatusFlags) {
        self.pending_error = flags - StatusFlags::READY;
    }

    /// Lock the inclusive address range `start..=end` against programming
    ///
    /// Returns false if the protection table is full.
    pub fn protect(&mut self, start: Address, end: Address) -> bool {
        self.protected.push((start, end)).is_ok()
    }

    /// Number of program operations the device accepted
    pub fn program_count(&self) -> u32 {
        self.program_count
    }

    /// Number of reset commands received
    pub fn reset_count(&self) -> u32 {
        self.reset_count
    }

    /// Number of status register reads
    pub fn status_reads(&self) -> u32 {
        self.status_reads
    }

    fn is_protected(&self, addr: Address) -> bool {
        self.protected
            .iter()
            .any(|&(start, end)| addr >= start && addr <= end)
    }

    fn program(&mut self, addr: Address, value: Word) {
        self.program_count += 1;
        self.mode = Mode::ReadStatus;
        self.busy_remaining = self.config.busy_polls;

        let mut error = core::mem::take(&mut self.pending_error);
        if self.vpp_low {
            error |= StatusFlags::VPP_ERROR | StatusFlags::PROGRAM_ERROR;
        }
        if self.is_protected(addr) {
            error |= StatusFlags::BLOCK_PROTECTION;
        }
        self.status = error;

        if !error.is_empty() {
            log::debug!("dummy: program at 0x{:08X} rejected ({:?})", addr, error);
            return;
        }

        // NOR programming can only clear bits
        let programmed = self.cell(addr) & value;
        if self.cells.insert(addr, programmed).is_err() {
            // Out of room: treat like a cell that refuses to program
            log::warn!("dummy: cell table full, 0x{:08X} left unprogrammed", addr);
        }
    }

    fn command(&mut self, value: Word) {
        let layout = self.config.layout;
        if value == layout.program_command {
            self.mode = Mode::ProgramSetup;
        } else if value == layout.reset_command {
            self.reset_count += 1;
            self.mode = Mode::ReadArray;
            self.status = StatusFlags::empty();
            self.busy_remaining = 0;
        } else {
            log::warn!("dummy: ignoring unsupported command 0x{:04X}", value);
        }
    }

    fn read_status(&mut self) -> Word {
        self.status_reads += 1;
        let status = if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            self.status - StatusFlags::READY
        } else {
            self.status | StatusFlags::READY
        };
        self.config.layout.status_bits.encode(status)
    }
}

impl RegisterIo for DummyNor {
    fn read(&mut self, addr: Address) -> Word {
        if self.mode == Mode::ReadStatus && addr == self.config.layout.status_register {
            self.read_status()
        } else {
            self.cell(addr)
        }
    }

    fn write(&mut self, addr: Address, value: Word) {
        if self.mode == Mode::ProgramSetup {
            self.program(addr, value);
        } else if addr == self.config.layout.command_register {
            self.command(value);
        } else {
            log::warn!(
                "dummy: write of 0x{:04X} to 0x{:08X} outside program setup",
                value,
                addr
            );
        }
    }
}
