//! MBC3's real-time clock: a running register set, a latched snapshot
//! readable through banked reads, and the latch-trigger sequence
//! (§4.3, S5).

use serde::{Deserialize, Serialize};

use crate::CPU_HZ;

const DH_HALT: u8 = 1 << 6;
const DH_DAY_CARRY: u8 = 1 << 7;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtcRegisters {
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub day_low: u8,
    pub day_high: u8,
}

impl RtcRegisters {
    fn tick_second(&mut self) {
        if self.day_high & DH_HALT != 0 {
            return;
        }
        self.seconds = self.seconds.wrapping_add(1);
        if self.seconds < 60 {
            return;
        }
        self.seconds = 0;
        self.minutes = self.minutes.wrapping_add(1);
        if self.minutes < 60 {
            return;
        }
        self.minutes = 0;
        self.hours = self.hours.wrapping_add(1);
        if self.hours < 24 {
            return;
        }
        self.hours = 0;
        let (day, overflowed) = self.day_low.overflowing_add(1);
        self.day_low = day;
        if overflowed {
            // day counter is 9 bits: low 8 in DL, bit 8 in DH bit 0
            if self.day_high & 0x01 != 0 {
                // full 9-bit day counter (511) wrapped: sticky overflow
                self.day_high = (self.day_high & !0x01) | DH_DAY_CARRY;
            } else {
                self.day_high |= 0x01;
            }
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Rtc {
    pub running: RtcRegisters,
    pub latched: RtcRegisters,
    /// Leftover master-clock cycles not yet converted into a whole second.
    carry_cycles: u64,
    /// State machine for the 0x00 -> 0x01 latch-write sequence.
    #[serde(skip)]
    latch_armed: bool,
}

impl Rtc {
    /// Advance the running clock by `cycles` T-states (§4.3: "advances by
    /// one per 4194304 host cycles").
    pub fn step(&mut self, cycles: u32) {
        self.carry_cycles += cycles as u64;
        while self.carry_cycles >= CPU_HZ {
            self.carry_cycles -= CPU_HZ;
            self.running.tick_second();
        }
    }

    /// Handle a write to the latch-trigger register (0x6000-0x7FFF).
    /// The documented sequence is a write of 0x00 followed by 0x01.
    pub fn write_latch_trigger(&mut self, value: u8) {
        match value {
            0x00 => self.latch_armed = true,
            0x01 if self.latch_armed => {
                self.latched = self.running;
                self.latch_armed = false;
            }
            _ => self.latch_armed = false,
        }
    }

    pub fn read_register(&self, index: u8) -> u8 {
        match index {
            0x08 => self.latched.seconds,
            0x09 => self.latched.minutes,
            0x0A => self.latched.hours,
            0x0B => self.latched.day_low,
            0x0C => self.latched.day_high & (DH_HALT | DH_DAY_CARRY | 0x01),
            _ => 0xFF,
        }
    }

    pub fn write_register(&mut self, index: u8, value: u8) {
        match index {
            0x08 => self.running.seconds = value % 60,
            0x09 => self.running.minutes = value % 60,
            0x0A => self.running.hours = value % 24,
            0x0B => self.running.day_low = value,
            0x0C => self.running.day_high = value & (DH_HALT | DH_DAY_CARRY | 0x01),
            _ => {}
        }
    }

    /// Re-anchor the running clock after a save/load cycle so that
    /// wall-clock time elapsed while powered off is counted, per the
    /// spec's save-format note (§4.3): the implementer may choose to
    /// advance the clock by the host-measured delta at load time rather
    /// than by emulated cycles. `elapsed_secs` is `now - last_save_time`.
    pub fn catch_up(&mut self, elapsed_secs: u64) {
        for _ in 0..elapsed_secs {
            self.running.tick_second();
        }
    }
}
