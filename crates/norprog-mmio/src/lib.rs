//! norprog-mmio - Memory-mapped NOR flash access for norprog
//!
//! This crate drives a parallel NOR flash that is visible in the host's
//! physical address space (boot flash on embedded Linux boards, FPGA
//! memory windows, and similar). The flash window is mapped through
//! `/dev/mem` and accessed with volatile 16-bit loads and stores; timing
//! comes from the host's monotonic clock.
//!
//! # Example
//!
//! ```no_run
//! use norprog_mmio::open_mmio;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut flash = open_mmio(&[("base", "0xff800000"), ("timeout_us", "10000")])?;
//!     flash.write(0x1000, 0xBEEF)?;
//!     Ok(())
//! }
//! ```
//!
//! # System Requirements
//!
//! - Linux with `/dev/mem` access to the flash window
//!   (`CONFIG_STRICT_DEVMEM` may have to be disabled)
//! - Root privileges

pub mod clock;
pub mod error;
pub mod physmap;
pub mod registers;

pub use clock::StdClock;
pub use error::{MmioError, Result};
pub use physmap::PhysMap;
pub use registers::MmioRegisters;

use log::{info, warn};
use norprog_core::{DeviceLayout, FlashProgrammer, ProgramConfig};

/// Default window size: 16 Mbit, one M28W160ECT
pub const DEFAULT_WINDOW_SIZE: usize = 2 * 1024 * 1024;

/// Configuration for opening a memory-mapped flash
#[derive(Debug, Clone)]
pub struct MmioConfig {
    /// Physical base address of the flash window
    pub base: u64,
    /// Size of the flash window in bytes
    pub size: usize,
    /// Register layout of the device
    pub layout: DeviceLayout,
    /// Program timing
    pub program: ProgramConfig,
}

impl MmioConfig {
    /// Create a configuration for an M28W160ECT at `base`
    pub fn new(base: u64) -> Self {
        Self {
            base,
            size: DEFAULT_WINDOW_SIZE,
            layout: DeviceLayout::m28w160ect(),
            program: ProgramConfig::default(),
        }
    }
}

/// Map the flash window and return a ready programmer
pub fn open(config: &MmioConfig) -> Result<FlashProgrammer<MmioRegisters, StdClock>> {
    let registers = MmioRegisters::new(PhysMap::new(config.base, config.size)?);
    info!(
        "Opened flash window at {:#x} ({} words)",
        registers.map().phys_addr(),
        registers.words()
    );
    Ok(FlashProgrammer::new(
        registers,
        StdClock::new(),
        config.layout,
        config.program,
    ))
}

/// Parse programmer options into an [`MmioConfig`]
///
/// # Options
///
/// - `base=<addr>` - Required: physical base address of the flash window
/// - `size=<bytes>` - Window size (default 2 MiB)
/// - `chip=<name>` - Register layout, only `m28w160ect` is known
/// - `timeout_us=<us>` - Program timeout (default 5000)
/// - `poll_delay_us=<us>` - Delay between status polls (default 0)
///
/// Numbers may be decimal or `0x`-prefixed hexadecimal.
pub fn parse_options(options: &[(&str, &str)]) -> Result<MmioConfig> {
    let mut base: Option<u64> = None;
    let mut config = MmioConfig::new(0);

    for (key, value) in options {
        match *key {
            "base" => base = Some(parse_number("base", value)?),
            "size" => {
                let size = parse_number("size", value)?;
                config.size = usize::try_from(size)
                    .ok()
                    .filter(|&size| size >= 2)
                    .ok_or_else(|| MmioError::InvalidParameter {
                        name: "size",
                        message: format!("'{}' is not a usable window size", value),
                    })?;
            }
            "chip" => {
                config.layout = match value.to_ascii_lowercase().as_str() {
                    "m28w160ect" => DeviceLayout::m28w160ect(),
                    _ => {
                        return Err(MmioError::InvalidParameter {
                            name: "chip",
                            message: format!("unknown chip '{}'", value),
                        })
                    }
                };
            }
            "timeout_us" => {
                config.program.timeout_us = parse_u32("timeout_us", value)?;
            }
            "poll_delay_us" => {
                config.program.poll_delay_us = parse_u32("poll_delay_us", value)?;
            }
            _ => {
                warn!("Unknown mmio option: {}={}", key, value);
            }
        }
    }

    config.base = base.ok_or(MmioError::MissingParameter("base"))?;
    Ok(config)
}

/// Parse options, map the flash window and return a ready programmer
pub fn open_mmio(options: &[(&str, &str)]) -> Result<FlashProgrammer<MmioRegisters, StdClock>> {
    let config = parse_options(options)?;
    open(&config)
}

fn parse_number(name: &'static str, value: &str) -> Result<u64> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| MmioError::InvalidParameter {
        name,
        message: format!("'{}' is not a valid number", value),
    })
}

fn parse_u32(name: &'static str, value: &str) -> Result<u32> {
    u32::try_from(parse_number(name, value)?).map_err(|_| MmioError::InvalidParameter {
        name,
        message: format!("'{}' does not fit in 32 bits", value),
    })
}
