//! Scripted register I/O
//!
//! [`MockIo`] holds an ordered list of expected bus transactions. Each read
//! or write the code under test performs must match the next expectation
//! exactly; reads return the scripted value. Any mismatch, any call beyond
//! the script, and any expectation left over at [`MockIo::verify_complete`]
//! fails the test with a message naming the expected and actual calls.

use core::fmt;
use heapless::Vec;
use norprog_core::io::{Address, RegisterIo, Word};

/// A single expected bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Read from `addr`, returning `value`
    Read {
        /// Address read
        addr: Address,
        /// Value handed back to the caller
        value: Word,
    },
    /// Write `value` to `addr`
    Write {
        /// Address written
        addr: Address,
        /// Value written
        value: Word,
    },
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { addr, value } => {
                write!(f, "read(0x{:08X}) returning 0x{:04X}", addr, value)
            }
            Self::Write { addr, value } => write!(f, "write(0x{:08X}, 0x{:04X})", addr, value),
        }
    }
}

/// Register I/O that replays a fixed script of up to `N` transactions
#[derive(Debug, Default)]
pub struct MockIo<const N: usize> {
    expectations: Vec<Expectation, N>,
    next: usize,
}

impl<const N: usize> MockIo<N> {
    /// Create an empty script
    pub fn new() -> Self {
        Self {
            expectations: Vec::new(),
            next: 0,
        }
    }

    fn push(&mut self, expectation: Expectation) {
        if self.expectations.push(expectation).is_err() {
            panic!(
                "MockIo: too many expectations (capacity {}), cannot add {}",
                N, expectation
            );
        }
    }

    /// Expect a write of `value` to `addr`
    pub fn expect_write(&mut self, addr: Address, value: Word) -> &mut Self {
        self.push(Expectation::Write { addr, value });
        self
    }

    /// Expect a read of `addr` and return `value` for it
    pub fn expect_read_then_return(&mut self, addr: Address, value: Word) -> &mut Self {
        self.push(Expectation::Read { addr, value });
        self
    }

    /// Number of expectations not yet consumed
    pub fn remaining(&self) -> usize {
        self.expectations.len() - self.next
    }

    /// Fail unless every expectation has been consumed
    pub fn verify_complete(&self) {
        if let Some(missing) = self.expectations.get(self.next) {
            panic!(
                "MockIo: expected {} more call(s), next expected {} (after {} of {})",
                self.remaining(),
                missing,
                self.next,
                self.expectations.len()
            );
        }
    }

    /// Consume the next expectation, failing if it differs from `actual`
    ///
    /// Returns the scripted value of the consumed expectation.
    fn take(&mut self, actual: Expectation) -> Word {
        let Some(&expected) = self.expectations.get(self.next) else {
            panic!(
                "MockIo: unexpected {} after all {} expectations were used",
                actual,
                self.expectations.len()
            );
        };

        let matches = match (expected, actual) {
            (Expectation::Read { addr: want, .. }, Expectation::Read { addr, .. }) => want == addr,
            (a, b) => a == b,
        };
        if !matches {
            panic!(
                "MockIo: call #{} expected {}\n\t        but was {}",
                self.next + 1,
                expected,
                actual
            );
        }

        self.next += 1;
        match expected {
            Expectation::Read { value, .. } | Expectation::Write { value, .. } => value,
        }
    }
}

impl<const N: usize> RegisterIo for MockIo<N> {
    fn read(&mut self, addr: Address) -> Word {
        self.take(Expectation::Read { addr, value: 0 })
    }

    fn write(&mut self, addr: Address, value: Word) {
        self.take(Expectation::Write { addr, value });
    }
}
