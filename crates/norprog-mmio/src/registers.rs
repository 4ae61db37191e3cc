//! Register I/O over a physical mapping

use crate::physmap::PhysMap;
use norprog_core::io::{Address, RegisterIo, Word};

/// Value returned for reads that fall outside the mapping
const FLOATING_BUS: Word = 0xFFFF;

/// 16-bit register access to a memory-mapped flash window
///
/// Addresses are word offsets from the start of the window, matching the
/// x16 command tables in NOR datasheets. Word `n` lives at byte offset
/// `2 * n`. Accesses outside the window are dropped (writes) or read as
/// `0xFFFF` and logged.
#[derive(Debug)]
pub struct MmioRegisters {
    map: PhysMap,
}

impl MmioRegisters {
    /// Wrap an existing mapping
    pub fn new(map: PhysMap) -> Self {
        Self { map }
    }

    /// Get the underlying mapping
    pub fn map(&self) -> &PhysMap {
        &self.map
    }

    /// Number of words addressable through this window
    pub fn words(&self) -> usize {
        self.map.size() / 2
    }

    fn byte_offset(addr: Address) -> Option<usize> {
        usize::try_from(addr).ok()?.checked_mul(2)
    }
}

impl RegisterIo for MmioRegisters {
    fn read(&mut self, addr: Address) -> Word {
        match Self::byte_offset(addr).and_then(|offset| self.map.read16(offset)) {
            Some(value) => value,
            None => {
                log::warn!("mmio: read of word 0x{:08X} outside flash window", addr);
                FLOATING_BUS
            }
        }
    }

    fn write(&mut self, addr: Address, value: Word) {
        let written = Self::byte_offset(addr).is_some_and(|offset| self.map.write16(offset, value));
        if !written {
            log::warn!(
                "mmio: dropped write of 0x{:04X} to word 0x{:08X} outside flash window",
                value,
                addr
            );
        }
    }
}
