//! Device register layouts
//!
//! A [`DeviceLayout`] names where a device family keeps its command and
//! status registers, which command codes it understands and how its status
//! bits are arranged. These are fixed per device family and never probed.

use crate::io::{Address, Word};
use crate::status::StatusBitMap;

/// Register addresses, command codes and status bit layout of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceLayout {
    /// Address commands are written to
    pub command_register: Address,
    /// Address the status register is read from
    pub status_register: Address,
    /// Program setup command code
    pub program_command: Word,
    /// Reset (read array) command code
    pub reset_command: Word,
    /// Status register bit positions
    #[cfg_attr(feature = "std", serde(default))]
    pub status_bits: StatusBitMap,
}

impl DeviceLayout {
    /// ST M28W160ECT 16 Mbit (1M x 16) boot block flash
    ///
    /// Commands and status share offset 0. Program setup is 0x40, read
    /// array (reset) is 0xFF.
    pub const fn m28w160ect() -> Self {
        Self {
            command_register: 0x0,
            status_register: 0x0,
            program_command: 0x40,
            reset_command: 0xFF,
            status_bits: StatusBitMap::canonical(),
        }
    }
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self::m28w160ect()
    }
}
