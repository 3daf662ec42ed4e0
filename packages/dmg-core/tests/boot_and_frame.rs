//! Boot-state and whole-frame smoke tests (§2, §5 "Scheduling model").

mod common;

use dmg_core::{LCD_HEIGHT, LCD_WIDTH};

/// `JR -2` spins on its own address forever; a realistic minimal program
/// for exercising "run the system for a while and nothing falls over".
const SPIN: &[u8] = &[0x18, 0xFE];

#[test]
fn fresh_gameboy_boots_at_0x0100_with_no_fault() {
    let gb = common::gameboy_with_program(SPIN);
    assert!(gb.fault().is_none());
}

#[test]
fn step_frame_advances_until_the_ppu_has_a_frame_ready() {
    let mut gb = common::gameboy_with_program(SPIN);
    gb.step_frame();
    assert!(gb.fault().is_none());
    let frame = gb.take_frame();
    assert_eq!(frame.len(), LCD_WIDTH * LCD_HEIGHT);
}

#[test]
fn several_consecutive_frames_keep_the_cpu_free_running() {
    let mut gb = common::gameboy_with_program(SPIN);
    for _ in 0..4 {
        gb.step_frame();
        assert!(gb.fault().is_none());
        let _ = gb.take_frame();
    }
}

#[test]
fn unrecognized_opcode_halts_the_whole_system_not_just_the_cpu() {
    // 0xFC/0xFD/0xEC/0xED/0xDD/... are all unused in the SM83 table.
    let mut gb = common::gameboy_with_program(&[0xFC]);
    let steps = common::run_until_halted(&mut gb, 10);
    assert!(steps < 10, "expected a fault well before the step budget");
    assert!(gb.fault().is_some());

    let cycles = gb.step();
    assert_eq!(cycles, 0, "a halted system must no-op further steps");
}
