//! norprog-core - Core library for programming words into NOR flash
//!
//! This crate implements the vendor program algorithm for parallel NOR
//! flash parts that expose a command register and a status register in
//! their memory-mapped address space:
//!
//! 1. Write the program command to the command register
//! 2. Write the data word to the target address
//! 3. Poll the status register until the device reports ready
//! 4. Decode the error flags, resetting the device on failure
//! 5. Read the word back and compare it with what was written
//!
//! Register access and timekeeping are injected through the
//! [`RegisterIo`](io::RegisterIo) and [`TimeSource`](io::TimeSource) traits
//! so the state machine runs unchanged against real hardware or test doubles.
//! It is `no_std` compatible.
//!
//! # Features
//!
//! - `std` - Enable standard library support (serde derives for layouts
//!   and configuration)
//!
//! # Example
//!
//! ```ignore
//! use norprog_core::{DeviceLayout, FlashProgrammer, ProgramConfig, RegisterIo, TimeSource};
//!
//! fn program<IO: RegisterIo, T: TimeSource>(io: IO, clock: T) {
//!     let mut flash = FlashProgrammer::new(
//!         io,
//!         clock,
//!         DeviceLayout::m28w160ect(),
//!         ProgramConfig::default(),
//!     );
//!     match flash.write(0x1000, 0xBEEF) {
//!         Ok(()) => println!("programmed"),
//!         Err(e) => println!("program failed: {}", e),
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod device;
pub mod error;
pub mod io;
pub mod program;
pub mod status;

pub use device::DeviceLayout;
pub use error::{Error, ProgramOutcome, Result};
pub use io::{Address, RegisterIo, TimeSource, Word};
pub use program::{write_word, FlashProgrammer, ProgramConfig};
pub use status::{StatusBitMap, StatusClass, StatusFlags};
