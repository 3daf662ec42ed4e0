//! C1: the interrupt controller — a pair of 5-bit fields, IF (requests)
//! and IE (enables), in priority order VBlank, LCD-STAT, Timer, Serial,
//! Joypad (§3, §4.7).

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Interrupt: u8 {
        const VBLANK   = 1 << 0;
        const LCD_STAT = 1 << 1;
        const TIMER    = 1 << 2;
        const SERIAL   = 1 << 3;
        const JOYPAD   = 1 << 4;
    }
}

impl Interrupt {
    /// The dispatch vector address for this single-bit interrupt source.
    pub fn vector(self) -> u16 {
        0x40 + 8 * self.bits().trailing_zeros() as u16
    }
}

/// Top 3 bits of IF always read back as 1; IE has no such constraint on
/// real hardware but we mask writes to the 5 defined bits regardless,
/// since nothing observes the difference.
const UNUSED_IF_BITS: u8 = 0xE0;

#[derive(Debug, Default, Clone, Copy)]
pub struct InterruptController {
    pub ie: u8,
    iflag: u8,
}

pub trait WithInterrupts {
    fn interrupts(&self) -> &InterruptController;
    fn interrupts_mut(&mut self) -> &mut InterruptController;
}

impl InterruptController {
    pub fn request(&mut self, source: Interrupt) {
        self.iflag |= source.bits();
    }

    pub fn clear(&mut self, source: Interrupt) {
        self.iflag &= !source.bits();
    }

    pub fn read_if(&self) -> u8 {
        self.iflag | UNUSED_IF_BITS
    }

    pub fn write_if(&mut self, value: u8) {
        self.iflag = value & Interrupt::all().bits();
    }

    pub fn read_ie(&self) -> u8 {
        self.ie
    }

    pub fn write_ie(&mut self, value: u8) {
        self.ie = value;
    }

    /// The lowest-numbered (highest priority) pending & enabled interrupt,
    /// or `None`.
    pub fn pending(&self) -> Option<Interrupt> {
        let active = self.iflag & self.ie & Interrupt::all().bits();
        if active == 0 {
            None
        } else {
            Interrupt::from_bits(1 << active.trailing_zeros())
        }
    }

    pub fn any_pending(&self) -> bool {
        self.iflag & self.ie & Interrupt::all().bits() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_is_lowest_bit_first() {
        let mut ic = InterruptController::default();
        ic.write_ie(0xFF);
        ic.request(Interrupt::TIMER);
        ic.request(Interrupt::VBLANK);
        assert_eq!(ic.pending(), Some(Interrupt::VBLANK));
    }

    #[test]
    fn disabled_source_is_not_pending() {
        let mut ic = InterruptController::default();
        ic.write_ie(Interrupt::TIMER.bits());
        ic.request(Interrupt::VBLANK);
        assert_eq!(ic.pending(), None);
    }

    #[test]
    fn read_if_sets_unused_bits() {
        let ic = InterruptController::default();
        assert_eq!(ic.read_if() & UNUSED_IF_BITS, UNUSED_IF_BITS);
    }

    #[test]
    fn vectors_match_canonical_addresses() {
        assert_eq!(Interrupt::VBLANK.vector(), 0x40);
        assert_eq!(Interrupt::LCD_STAT.vector(), 0x48);
        assert_eq!(Interrupt::TIMER.vector(), 0x50);
        assert_eq!(Interrupt::SERIAL.vector(), 0x58);
        assert_eq!(Interrupt::JOYPAD.vector(), 0x60);
    }
}
