//! norprog-dummy - Test doubles for the NOR program driver
//!
//! This crate provides the pieces needed to exercise the program driver
//! without hardware:
//!
//! - [`MockIo`]: register I/O that replays a script of expected reads and
//!   writes and fails on any deviation
//! - [`FakeClock`]: a microsecond clock that advances by a fixed step on
//!   every query
//! - [`DummyNor`]: an in-memory device emulating the program command set

#![cfg_attr(not(feature = "std"), no_std)]

pub mod clock;
pub mod emulator;
pub mod mock;

pub use clock::FakeClock;
pub use emulator::{DummyConfig, DummyNor};
pub use mock::{Expectation, MockIo};

#[cfg(test)]
mod tests {
    use super::*;
    use norprog_core::{
        DeviceLayout, Error, FlashProgrammer, ProgramConfig, ProgramOutcome, StatusFlags,
    };

    const ADDRESS: u32 = 0x1000;
    const DATA: u16 = 0xBEEF;

    const LAYOUT: DeviceLayout = DeviceLayout::m28w160ect();
    const COMMAND_REGISTER: u32 = LAYOUT.command_register;
    const STATUS_REGISTER: u32 = LAYOUT.status_register;
    const PROGRAM_COMMAND: u16 = LAYOUT.program_command;
    const RESET_COMMAND: u16 = LAYOUT.reset_command;

    const READY: u16 = StatusFlags::READY.bits();
    const VPP_ERROR: u16 = StatusFlags::VPP_ERROR.bits();
    const PROGRAM_ERROR: u16 = StatusFlags::PROGRAM_ERROR.bits();
    const BLOCK_PROTECTION: u16 = StatusFlags::BLOCK_PROTECTION.bits();
    const ERASE_SUSPEND: u16 = StatusFlags::ERASE_SUSPEND.bits();
    const ERASE_ERROR: u16 = StatusFlags::ERASE_ERROR.bits();
    const PROGRAM_SUSPEND: u16 = StatusFlags::PROGRAM_SUSPEND.bits();
    const RESERVED: u16 = StatusFlags::RESERVED.bits();

    // Room for the longest script: two writes plus twenty status reads
    const SCRIPT_CAPACITY: usize = 32;

    type Programmer = FlashProgrammer<MockIo<SCRIPT_CAPACITY>, FakeClock>;

    fn programmer(clock: FakeClock) -> Programmer {
        FlashProgrammer::new(MockIo::new(), clock, LAYOUT, ProgramConfig::default())
    }

    fn expect_program_sequence(io: &mut MockIo<SCRIPT_CAPACITY>) {
        io.expect_write(COMMAND_REGISTER, PROGRAM_COMMAND)
            .expect_write(ADDRESS, DATA);
    }

    fn expect_failure_with_reset(status: u16) -> Programmer {
        let mut flash = programmer(FakeClock::new(0, 1));
        let io = flash.io_mut();
        expect_program_sequence(io);
        io.expect_read_then_return(STATUS_REGISTER, READY | status)
            .expect_write(COMMAND_REGISTER, RESET_COMMAND);
        flash
    }

    #[test]
    fn test_write_succeeds_ready_immediately() {
        let mut flash = programmer(FakeClock::new(0, 1));
        let io = flash.io_mut();
        expect_program_sequence(io);
        io.expect_read_then_return(STATUS_REGISTER, READY)
            .expect_read_then_return(ADDRESS, DATA);

        assert_eq!(flash.write(ADDRESS, DATA), Ok(()));
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_succeeds_not_immediately_ready() {
        let mut flash = programmer(FakeClock::new(0, 1));
        let io = flash.io_mut();
        expect_program_sequence(io);
        io.expect_read_then_return(STATUS_REGISTER, 0)
            .expect_read_then_return(STATUS_REGISTER, 0)
            .expect_read_then_return(STATUS_REGISTER, 0)
            .expect_read_then_return(STATUS_REGISTER, READY)
            .expect_read_then_return(ADDRESS, DATA);

        assert_eq!(flash.write(ADDRESS, DATA), Ok(()));
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_fails_vpp_error() {
        let mut flash = expect_failure_with_reset(VPP_ERROR);
        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::VppError));
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_fails_program_error() {
        let mut flash = expect_failure_with_reset(PROGRAM_ERROR);
        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::ProgramError));
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_fails_protected_block_error() {
        let mut flash = expect_failure_with_reset(BLOCK_PROTECTION);
        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::ProtectedBlockError));
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_fails_unknown_program_error() {
        let status = ERASE_SUSPEND | ERASE_ERROR | PROGRAM_SUSPEND | RESERVED;
        let mut flash = expect_failure_with_reset(status);
        assert_eq!(
            flash.write(ADDRESS, DATA),
            Err(Error::UnknownProgramError {
                status: READY | status
            })
        );
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_fails_unknown_program_error_single_flags() {
        for status in [ERASE_SUSPEND, ERASE_ERROR, PROGRAM_SUSPEND, RESERVED] {
            let mut flash = expect_failure_with_reset(status);
            let result = flash.write(ADDRESS, DATA);
            assert_eq!(
                ProgramOutcome::from(result),
                ProgramOutcome::UnknownProgramError,
                "status 0x{:04X}",
                status
            );
            flash.io().verify_complete();
        }
    }

    #[test]
    fn test_write_fails_read_back_error() {
        let mut flash = programmer(FakeClock::new(0, 1));
        let io = flash.io_mut();
        expect_program_sequence(io);
        io.expect_read_then_return(STATUS_REGISTER, READY)
            .expect_read_then_return(ADDRESS, DATA - 1);

        assert_eq!(
            flash.write(ADDRESS, DATA),
            Err(Error::ReadBackError {
                address: ADDRESS,
                expected: DATA,
                found: DATA - 1,
            })
        );
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_succeeds_ignores_other_bits_until_ready() {
        let mut flash = programmer(FakeClock::new(0, 1));
        let io = flash.io_mut();
        expect_program_sequence(io);
        io.expect_read_then_return(STATUS_REGISTER, !READY)
            .expect_read_then_return(STATUS_REGISTER, READY)
            .expect_read_then_return(ADDRESS, DATA);

        assert_eq!(flash.write(ADDRESS, DATA), Ok(()));
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_succeeds_ignores_unmapped_bits_when_ready() {
        let mut flash = programmer(FakeClock::new(0, 1));
        let io = flash.io_mut();
        expect_program_sequence(io);
        io.expect_read_then_return(STATUS_REGISTER, 0xFF00 | READY)
            .expect_read_then_return(ADDRESS, DATA);

        assert_eq!(flash.write(ADDRESS, DATA), Ok(()));
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_fails_timeout() {
        let mut flash = programmer(FakeClock::new(0, 500));
        let io = flash.io_mut();
        expect_program_sequence(io);
        for _ in 0..10 {
            io.expect_read_then_return(STATUS_REGISTER, !READY);
        }

        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::Timeout));
        flash.io().verify_complete();
    }

    #[test]
    fn test_write_fails_timeout_at_end_of_time() {
        let mut flash = programmer(FakeClock::new(0xFFFF_FFFF, 500));
        let io = flash.io_mut();
        expect_program_sequence(io);
        for _ in 0..10 {
            io.expect_read_then_return(STATUS_REGISTER, !READY);
        }

        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::Timeout));
        flash.io().verify_complete();
    }

    #[test]
    fn test_timeout_is_bounded_by_time_not_polls() {
        // 250us per query reaches the 5000us bound after twice as many polls
        let mut flash = programmer(FakeClock::new(0, 250));
        let io = flash.io_mut();
        expect_program_sequence(io);
        for _ in 0..20 {
            io.expect_read_then_return(STATUS_REGISTER, 0);
        }

        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::Timeout));
        flash.io().verify_complete();
        // Start time plus one query per busy poll
        assert_eq!(flash.clock_mut().queries(), 21);
    }

    #[test]
    fn test_configured_timeout_and_poll_delay() {
        let config = ProgramConfig::default()
            .with_timeout_us(3_000)
            .with_poll_delay_us(1_000);
        let mut flash = FlashProgrammer::new(
            MockIo::<SCRIPT_CAPACITY>::new(),
            FakeClock::new(0, 0),
            LAYOUT,
            config,
        );
        let io = flash.io_mut();
        expect_program_sequence(io);
        // Elapsed after each busy poll: 0, 1000, 2000, 3000
        for _ in 0..4 {
            io.expect_read_then_return(STATUS_REGISTER, 0);
        }

        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::Timeout));
        flash.io().verify_complete();
    }

    #[test]
    fn test_start_time_is_read_once_per_write() {
        let mut flash = programmer(FakeClock::new(0, 1));
        let io = flash.io_mut();
        expect_program_sequence(io);
        io.expect_read_then_return(STATUS_REGISTER, READY)
            .expect_read_then_return(ADDRESS, DATA);

        assert_eq!(flash.write(ADDRESS, DATA), Ok(()));
        assert_eq!(flash.clock_mut().queries(), 1);
    }

    #[test]
    fn test_write_is_repeatable() {
        let mut flash = programmer(FakeClock::new(0, 1));
        for _ in 0..2 {
            let io = flash.io_mut();
            expect_program_sequence(io);
            io.expect_read_then_return(STATUS_REGISTER, READY)
                .expect_read_then_return(ADDRESS, DATA);
        }

        assert_eq!(flash.write(ADDRESS, DATA), Ok(()));
        assert_eq!(flash.io().remaining(), 4);
        assert_eq!(flash.write(ADDRESS, DATA), Ok(()));
        flash.io().verify_complete();
    }

    #[test]
    fn test_emulated_write_with_ron_config() {
        let layout: DeviceLayout = ron::from_str(
            r#"(
                command_register: 0x5555,
                status_register: 0x5555,
                program_command: 0x10,
                reset_command: 0xF0,
            )"#,
        )
        .unwrap();
        let config: ProgramConfig = ron::from_str("(timeout_us: 2000)").unwrap();
        assert_eq!(config, ProgramConfig::new(2_000));

        let device = DummyNor::new(DummyConfig {
            layout,
            busy_polls: u32::MAX,
        });
        assert_eq!(device.config().layout, layout);
        let mut flash = FlashProgrammer::new(device, FakeClock::new(0, 500), layout, config);

        // The emulator only answers the layout's command codes
        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::Timeout));
        assert_eq!(flash.io().program_count(), 1);
        assert_eq!(flash.io().status_reads(), 4);

        flash.io_mut().set_busy_polls(0);
        assert_eq!(flash.write(ADDRESS, DATA), Ok(()));
        assert_eq!(flash.io().cell(ADDRESS), DATA);
    }

    #[test]
    fn test_emulated_write_succeeds() {
        let mut flash = FlashProgrammer::new(
            DummyNor::new(DummyConfig {
                busy_polls: 3,
                ..DummyConfig::default()
            }),
            FakeClock::new(0, 1),
            LAYOUT,
            ProgramConfig::default(),
        );

        assert_eq!(flash.write(ADDRESS, DATA), Ok(()));

        let device = flash.io();
        assert_eq!(device.cell(ADDRESS), DATA);
        assert_eq!(device.status_reads(), 4);
        assert_eq!(device.reset_count(), 0);
    }

    #[test]
    fn test_emulated_write_cannot_set_bits() {
        let mut flash = FlashProgrammer::new(
            DummyNor::new_default(),
            FakeClock::default(),
            LAYOUT,
            ProgramConfig::default(),
        );

        assert_eq!(flash.write(ADDRESS, 0x0F0F), Ok(()));
        assert_eq!(
            flash.write(ADDRESS, 0xF0F0),
            Err(Error::ReadBackError {
                address: ADDRESS,
                expected: 0xF0F0,
                found: 0x0000,
            })
        );
        assert_eq!(flash.io().reset_count(), 0);
    }

    #[test]
    fn test_emulated_low_vpp_resets_device() {
        let mut device = DummyNor::new_default();
        device.set_vpp_low(true);
        let mut flash =
            FlashProgrammer::new(device, FakeClock::default(), LAYOUT, ProgramConfig::default());

        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::VppError));
        assert_eq!(flash.io().reset_count(), 1);
        assert_eq!(flash.io().cell(ADDRESS), emulator::ERASED);
    }

    #[test]
    fn test_emulated_protected_block() {
        let mut device = DummyNor::new_default();
        assert!(device.protect(0x0800, 0x17FF));
        let mut flash =
            FlashProgrammer::new(device, FakeClock::default(), LAYOUT, ProgramConfig::default());

        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::ProtectedBlockError));
        assert_eq!(flash.write(0x2000, DATA), Ok(()));
        assert_eq!(flash.io().reset_count(), 1);
    }

    #[test]
    fn test_emulated_hang_times_out() {
        let mut device = DummyNor::new_default();
        device.set_busy_polls(u32::MAX);
        let mut flash = FlashProgrammer::new(
            device,
            FakeClock::new(0, 500),
            LAYOUT,
            ProgramConfig::default(),
        );

        assert_eq!(flash.write(ADDRESS, DATA), Err(Error::Timeout));
        let device = flash.io();
        assert_eq!(device.status_reads(), 10);
        assert_eq!(device.reset_count(), 0);
    }
}
