//! Status register decoding and classification
//!
//! A raw status word is first decoded into [`StatusFlags`] through the
//! device's [`StatusBitMap`], then classified into a [`StatusClass`]. The
//! classification is a pure function so its precedence order can be tested
//! without running the polling loop.

use crate::error::Error;
use crate::io::Word;
use bitflags::bitflags;

bitflags! {
    /// Status register flags in canonical order
    ///
    /// The canonical positions follow the common Intel/ST command set
    /// layout. Devices with a different layout are translated through a
    /// [`StatusBitMap`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u16 {
        /// Reserved bit
        const RESERVED          = 1 << 0;
        /// Program/erase attempted on a protected block
        const BLOCK_PROTECTION  = 1 << 1;
        /// Program operation is suspended
        const PROGRAM_SUSPEND   = 1 << 2;
        /// Programming voltage out of range
        const VPP_ERROR         = 1 << 3;
        /// Program operation failed
        const PROGRAM_ERROR     = 1 << 4;
        /// Erase operation failed
        const ERASE_ERROR       = 1 << 5;
        /// Erase operation is suspended
        const ERASE_SUSPEND     = 1 << 6;
        /// Device is ready, status is valid
        const READY             = 1 << 7;
    }
}

impl Default for StatusFlags {
    fn default() -> Self {
        StatusFlags::empty()
    }
}

/// Result of classifying a status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Ready is clear; the other flags are not valid yet
    Busy,
    /// Ready with no error flags
    Ready,
    /// Ready with an error condition
    Failed(Error),
}

impl StatusFlags {
    /// Whether the device reports ready
    pub const fn is_ready(&self) -> bool {
        self.contains(Self::READY)
    }

    /// Classify this status
    ///
    /// Precedence when several flags are set: Vpp error, then program
    /// error, then block protection. Any remaining flag besides ready is
    /// reported as an unknown program error carrying the canonical bits.
    pub fn classify(self) -> StatusClass {
        if !self.is_ready() {
            return StatusClass::Busy;
        }

        let error = if self.contains(Self::VPP_ERROR) {
            Error::VppError
        } else if self.contains(Self::PROGRAM_ERROR) {
            Error::ProgramError
        } else if self.contains(Self::BLOCK_PROTECTION) {
            Error::ProtectedBlockError
        } else if self != Self::READY {
            Error::UnknownProgramError {
                status: self.bits(),
            }
        } else {
            return StatusClass::Ready;
        };

        StatusClass::Failed(error)
    }
}

/// Bit positions of the status flags in a device's status register
///
/// Bits of the raw word not named here are ignored when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusBitMap {
    /// Ready bit
    pub ready: u8,
    /// Vpp error bit
    pub vpp_error: u8,
    /// Program error bit
    pub program_error: u8,
    /// Block protection error bit
    pub block_protection: u8,
    /// Erase suspend bit
    pub erase_suspend: u8,
    /// Erase error bit
    pub erase_error: u8,
    /// Program suspend bit
    pub program_suspend: u8,
    /// Reserved bit
    pub reserved: u8,
}

impl StatusBitMap {
    /// Layout where every flag sits at its canonical position
    ///
    /// SR: READY(7), ES(6), EE(5), PE(4), VPP(3), PS(2), BP(1), R(0)
    pub const fn canonical() -> Self {
        Self {
            ready: 7,
            erase_suspend: 6,
            erase_error: 5,
            program_error: 4,
            vpp_error: 3,
            program_suspend: 2,
            block_protection: 1,
            reserved: 0,
        }
    }

    fn pairs(&self) -> [(u8, StatusFlags); 8] {
        [
            (self.ready, StatusFlags::READY),
            (self.vpp_error, StatusFlags::VPP_ERROR),
            (self.program_error, StatusFlags::PROGRAM_ERROR),
            (self.block_protection, StatusFlags::BLOCK_PROTECTION),
            (self.erase_suspend, StatusFlags::ERASE_SUSPEND),
            (self.erase_error, StatusFlags::ERASE_ERROR),
            (self.program_suspend, StatusFlags::PROGRAM_SUSPEND),
            (self.reserved, StatusFlags::RESERVED),
        ]
    }

    /// Decode a raw status word into flags
    pub fn decode(&self, raw: Word) -> StatusFlags {
        self.pairs()
            .into_iter()
            .filter(|&(bit, _)| raw & bit_mask(bit) != 0)
            .fold(StatusFlags::empty(), |acc, (_, flag)| acc | flag)
    }

    /// Encode flags into a raw status word
    pub fn encode(&self, flags: StatusFlags) -> Word {
        self.pairs()
            .into_iter()
            .filter(|&(_, flag)| flags.contains(flag))
            .fold(0, |acc, (bit, _)| acc | bit_mask(bit))
    }

    /// Mask of the raw word's ready bit
    pub fn ready_mask(&self) -> Word {
        bit_mask(self.ready)
    }
}

// Out-of-range bit indices map to an empty mask
fn bit_mask(bit: u8) -> Word {
    1u16.checked_shl(u32::from(bit)).unwrap_or(0)
}

impl Default for StatusBitMap {
    fn default() -> Self {
        Self::canonical()
    }
}
