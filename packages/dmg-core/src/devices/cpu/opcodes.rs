//! Base (non-CB) opcode table (§4.1). Organized as a single dispatch
//! match rather than a literal array of closures, per the design note on
//! avoiding heap-allocated closures — the match compiles to a jump table
//! and keeps the mnemonic groupings visible.

use super::cpu::{fetch16, fetch8, pop16, push16, WithCpu};
use super::registers::{Flags, Reg16};
use crate::devices::bus::Bus;
use crate::error::CoreError;

/// Fetch, decode, and execute one base-table instruction. Returns the
/// T-states consumed.
pub fn execute<T: WithCpu + Bus>(mb: &mut T, opcode: u8) -> u8 {
    match opcode {
        0x00 => 4, // NOP
        0xCB => {
            let sub = fetch8(mb);
            super::cb_opcodes::execute(mb, sub)
        }
        0x10 => {
            fetch8(mb); // STOP is nominally a 2-byte opcode
            mb.cpu_mut().stopped = true;
            4
        }
        0x76 => {
            mb.cpu_mut().halted = true;
            4
        }
        0xF3 => {
            mb.cpu_mut().request_di();
            4
        }
        0xFB => {
            mb.cpu_mut().request_ei();
            4
        }

        // 16-bit immediate load: LD rr,nn
        0x01 | 0x11 | 0x21 | 0x31 => {
            let rr = rp((opcode >> 4) & 0x03);
            let value = fetch16(mb);
            mb.cpu_mut().regs.set16(rr, value);
            12
        }
        // INC rr / DEC rr
        0x03 | 0x13 | 0x23 | 0x33 => {
            let rr = rp((opcode >> 4) & 0x03);
            let v = mb.cpu().regs.get16(rr).wrapping_add(1);
            mb.cpu_mut().regs.set16(rr, v);
            8
        }
        0x0B | 0x1B | 0x2B | 0x3B => {
            let rr = rp((opcode >> 4) & 0x03);
            let v = mb.cpu().regs.get16(rr).wrapping_sub(1);
            mb.cpu_mut().regs.set16(rr, v);
            8
        }
        // ADD HL,rr
        0x09 | 0x19 | 0x29 | 0x39 => {
            add_hl_rr(mb, rp((opcode >> 4) & 0x03));
            8
        }

        // indirect 8-bit loads through BC/DE/HL+/HL-
        0x02 => {
            let addr = mb.cpu().regs.bc();
            let a = mb.cpu().regs.a;
            mb.write(addr, a);
            8
        }
        0x12 => {
            let addr = mb.cpu().regs.de();
            let a = mb.cpu().regs.a;
            mb.write(addr, a);
            8
        }
        0x22 => {
            let addr = mb.cpu().regs.hl();
            let a = mb.cpu().regs.a;
            mb.write(addr, a);
            mb.cpu_mut().regs.set_hl(addr.wrapping_add(1));
            8
        }
        0x32 => {
            let addr = mb.cpu().regs.hl();
            let a = mb.cpu().regs.a;
            mb.write(addr, a);
            mb.cpu_mut().regs.set_hl(addr.wrapping_sub(1));
            8
        }
        0x0A => {
            let addr = mb.cpu().regs.bc();
            let v = mb.read(addr);
            mb.cpu_mut().regs.a = v;
            8
        }
        0x1A => {
            let addr = mb.cpu().regs.de();
            let v = mb.read(addr);
            mb.cpu_mut().regs.a = v;
            8
        }
        0x2A => {
            let addr = mb.cpu().regs.hl();
            let v = mb.read(addr);
            mb.cpu_mut().regs.a = v;
            mb.cpu_mut().regs.set_hl(addr.wrapping_add(1));
            8
        }
        0x3A => {
            let addr = mb.cpu().regs.hl();
            let v = mb.read(addr);
            mb.cpu_mut().regs.a = v;
            mb.cpu_mut().regs.set_hl(addr.wrapping_sub(1));
            8
        }

        0x08 => {
            let addr = fetch16(mb);
            let sp = mb.cpu().regs.sp;
            mb.write(addr, sp as u8);
            mb.write(addr.wrapping_add(1), (sp >> 8) as u8);
            20
        }
        0xF9 => {
            let hl = mb.cpu().regs.hl();
            mb.cpu_mut().regs.sp = hl;
            8
        }

        0xE8 => {
            let result = add_sp_e8(mb);
            mb.cpu_mut().regs.sp = result;
            16
        }
        0xF8 => {
            let result = add_sp_e8(mb);
            mb.cpu_mut().regs.set_hl(result);
            12
        }

        // INC r8 / DEC r8 (opcode & 0xC7 == 0x04 / 0x05)
        _ if opcode & 0xC7 == 0x04 => {
            let r = (opcode >> 3) & 0x07;
            let old_f = mb.cpu().regs.f;
            let v = read_r8(mb, r);
            let (result, f) = inc8(v, old_f);
            write_r8(mb, r, result);
            mb.cpu_mut().regs.f = f;
            if r == 6 {
                12
            } else {
                4
            }
        }
        _ if opcode & 0xC7 == 0x05 => {
            let r = (opcode >> 3) & 0x07;
            let old_f = mb.cpu().regs.f;
            let v = read_r8(mb, r);
            let (result, f) = dec8(v, old_f);
            write_r8(mb, r, result);
            mb.cpu_mut().regs.f = f;
            if r == 6 {
                12
            } else {
                4
            }
        }
        // LD r,n8
        _ if opcode & 0xC7 == 0x06 => {
            let r = (opcode >> 3) & 0x07;
            let n = fetch8(mb);
            write_r8(mb, r, n);
            if r == 6 {
                12
            } else {
                8
            }
        }

        0x07 => {
            rlca(mb);
            4
        }
        0x0F => {
            rrca(mb);
            4
        }
        0x17 => {
            rla(mb);
            4
        }
        0x1F => {
            rra(mb);
            4
        }
        0x27 => {
            daa(mb);
            4
        }
        0x2F => {
            cpl(mb);
            4
        }
        0x37 => {
            scf(mb);
            4
        }
        0x3F => {
            ccf(mb);
            4
        }

        0x18 => {
            jr(mb);
            12
        }
        0x20 | 0x28 | 0x30 | 0x38 => {
            let cc = (opcode >> 3) & 0x03;
            let offset = fetch8(mb) as i8;
            if cc_true(mb.cpu().regs.f, cc) {
                let pc = mb.cpu().regs.pc;
                mb.cpu_mut().regs.pc = (pc as i16).wrapping_add(offset as i16) as u16;
                12
            } else {
                8
            }
        }

        // LD r,r' (0x40-0x7F, minus 0x76 handled above as HALT)
        0x40..=0x7F => {
            let dst = (opcode >> 3) & 0x07;
            let src = opcode & 0x07;
            let v = read_r8(mb, src);
            write_r8(mb, dst, v);
            if dst == 6 || src == 6 {
                8
            } else {
                4
            }
        }

        // ALU A,r8 (0x80-0xBF)
        0x80..=0xBF => {
            let group = (opcode >> 3) & 0x07;
            let r = opcode & 0x07;
            let operand = read_r8(mb, r);
            alu_op(mb, group, operand);
            if r == 6 {
                8
            } else {
                4
            }
        }
        // ALU A,n8
        _ if opcode & 0xC7 == 0xC6 => {
            let group = (opcode >> 3) & 0x07;
            let n = fetch8(mb);
            alu_op(mb, group, n);
            8
        }

        0xC0 | 0xC8 | 0xD0 | 0xD8 => {
            let cc = (opcode >> 3) & 0x03;
            if cc_true(mb.cpu().regs.f, cc) {
                let target = pop16(mb);
                mb.cpu_mut().regs.pc = target;
                20
            } else {
                8
            }
        }
        0xC9 => {
            let target = pop16(mb);
            mb.cpu_mut().regs.pc = target;
            16
        }
        0xD9 => {
            let target = pop16(mb);
            mb.cpu_mut().regs.pc = target;
            mb.cpu_mut().ime = true;
            16
        }

        0xC1 | 0xD1 | 0xE1 | 0xF1 => {
            pop_rp2(mb, (opcode >> 4) & 0x03);
            12
        }
        0xC5 | 0xD5 | 0xE5 | 0xF5 => {
            push_rp2(mb, (opcode >> 4) & 0x03);
            16
        }

        0xC2 | 0xCA | 0xD2 | 0xDA => {
            let cc = (opcode >> 3) & 0x03;
            let target = fetch16(mb);
            if cc_true(mb.cpu().regs.f, cc) {
                mb.cpu_mut().regs.pc = target;
                16
            } else {
                12
            }
        }
        0xC3 => {
            let target = fetch16(mb);
            mb.cpu_mut().regs.pc = target;
            16
        }
        0xE9 => {
            mb.cpu_mut().regs.pc = mb.cpu().regs.hl();
            4
        }

        0xC4 | 0xCC | 0xD4 | 0xDC => {
            let cc = (opcode >> 3) & 0x03;
            let target = fetch16(mb);
            if cc_true(mb.cpu().regs.f, cc) {
                call(mb, target);
                24
            } else {
                12
            }
        }
        0xCD => {
            let target = fetch16(mb);
            call(mb, target);
            24
        }

        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
            let target = (opcode & 0x38) as u16;
            call(mb, target);
            16
        }

        0xE0 => {
            let n = fetch8(mb);
            let a = mb.cpu().regs.a;
            mb.write(0xFF00 + n as u16, a);
            12
        }
        0xF0 => {
            let n = fetch8(mb);
            let v = mb.read(0xFF00 + n as u16);
            mb.cpu_mut().regs.a = v;
            12
        }
        0xE2 => {
            let c = mb.cpu().regs.c;
            let a = mb.cpu().regs.a;
            mb.write(0xFF00 + c as u16, a);
            8
        }
        0xF2 => {
            let c = mb.cpu().regs.c;
            let v = mb.read(0xFF00 + c as u16);
            mb.cpu_mut().regs.a = v;
            8
        }
        0xEA => {
            let addr = fetch16(mb);
            let a = mb.cpu().regs.a;
            mb.write(addr, a);
            16
        }
        0xFA => {
            let addr = fetch16(mb);
            let v = mb.read(addr);
            mb.cpu_mut().regs.a = v;
            16
        }

        // illegal opcodes (0xD3,0xDB,0xDD,0xE3,0xE4,0xEB,0xEC,0xED,0xF4,0xFC,0xFD)
        _ => {
            let pc = mb.cpu().regs.pc.wrapping_sub(1);
            log::error!("unrecognized opcode 0x{:02X} at 0x{:04X}", opcode, pc);
            mb.cpu_mut().fault = Some(CoreError::UnrecognizedOpcode { pc, opcode });
            4
        }
    }
}

fn rp(idx: u8) -> Reg16 {
    match idx {
        0 => Reg16::Bc,
        1 => Reg16::De,
        2 => Reg16::Hl,
        3 => Reg16::Sp,
        _ => unreachable!(),
    }
}

fn cc_true(f: Flags, idx: u8) -> bool {
    match idx {
        0 => !f.contains(Flags::Z),
        1 => f.contains(Flags::Z),
        2 => !f.contains(Flags::C),
        3 => f.contains(Flags::C),
        _ => unreachable!(),
    }
}

/// Maps the GB's standard 3-bit register encoding: B,C,D,E,H,L,(HL),A.
pub(super) fn read_r8<T: WithCpu + Bus>(mb: &mut T, idx: u8) -> u8 {
    match idx {
        0 => mb.cpu().regs.b,
        1 => mb.cpu().regs.c,
        2 => mb.cpu().regs.d,
        3 => mb.cpu().regs.e,
        4 => mb.cpu().regs.h,
        5 => mb.cpu().regs.l,
        6 => {
            let hl = mb.cpu().regs.hl();
            mb.read(hl)
        }
        7 => mb.cpu().regs.a,
        _ => unreachable!(),
    }
}

pub(super) fn write_r8<T: WithCpu + Bus>(mb: &mut T, idx: u8, value: u8) {
    match idx {
        0 => mb.cpu_mut().regs.b = value,
        1 => mb.cpu_mut().regs.c = value,
        2 => mb.cpu_mut().regs.d = value,
        3 => mb.cpu_mut().regs.e = value,
        4 => mb.cpu_mut().regs.h = value,
        5 => mb.cpu_mut().regs.l = value,
        6 => {
            let hl = mb.cpu().regs.hl();
            mb.write(hl, value)
        }
        7 => mb.cpu_mut().regs.a = value,
        _ => unreachable!(),
    }
}

fn push_rp2<T: WithCpu + Bus>(mb: &mut T, idx: u8) {
    let v = match idx {
        0 => mb.cpu().regs.bc(),
        1 => mb.cpu().regs.de(),
        2 => mb.cpu().regs.hl(),
        3 => mb.cpu().regs.af(),
        _ => unreachable!(),
    };
    push16(mb, v);
}

fn pop_rp2<T: WithCpu + Bus>(mb: &mut T, idx: u8) {
    let v = pop16(mb);
    match idx {
        0 => mb.cpu_mut().regs.set_bc(v),
        1 => mb.cpu_mut().regs.set_de(v),
        2 => mb.cpu_mut().regs.set_hl(v),
        3 => mb.cpu_mut().regs.set_af(v),
        _ => unreachable!(),
    }
}

fn call<T: WithCpu + Bus>(mb: &mut T, target: u16) {
    let pc = mb.cpu().regs.pc;
    push16(mb, pc);
    mb.cpu_mut().regs.pc = target;
}

fn jr<T: WithCpu + Bus>(mb: &mut T) {
    let offset = fetch8(mb) as i8;
    let pc = mb.cpu().regs.pc;
    mb.cpu_mut().regs.pc = (pc as i16).wrapping_add(offset as i16) as u16;
}

fn add_hl_rr<T: WithCpu + Bus>(mb: &mut T, rr: Reg16) {
    let hl = mb.cpu().regs.hl();
    let val = mb.cpu().regs.get16(rr);
    let result = hl.wrapping_add(val);
    let h = (hl & 0x0FFF) as u32 + (val & 0x0FFF) as u32 > 0x0FFF;
    let c = (hl as u32) + (val as u32) > 0xFFFF;
    let mut f = Flags::empty();
    if mb.cpu().regs.f.contains(Flags::Z) {
        f.insert(Flags::Z);
    }
    if h {
        f.insert(Flags::H);
    }
    if c {
        f.insert(Flags::C);
    }
    mb.cpu_mut().regs.f = f;
    mb.cpu_mut().regs.set_hl(result);
}

/// Shared by `ADD SP,e8` and `LD HL,SP+e8`: flags are computed as if the
/// signed operand were added as an unsigned byte to SP's low byte (§4.1).
fn add_sp_e8<T: WithCpu + Bus>(mb: &mut T) -> u16 {
    let raw = fetch8(mb);
    let e8 = raw as i8 as i16;
    let sp = mb.cpu().regs.sp;
    let result = (sp as i16).wrapping_add(e8) as u16;
    let low = sp as u8;
    let h = (low & 0x0F) as u16 + (raw & 0x0F) as u16 > 0x0F;
    let c = low as u16 + raw as u16 > 0xFF;
    let mut f = Flags::empty();
    if h {
        f.insert(Flags::H);
    }
    if c {
        f.insert(Flags::C);
    }
    mb.cpu_mut().regs.f = f;
    result
}

fn alu_op<T: WithCpu + Bus>(mb: &mut T, group: u8, operand: u8) {
    let a = mb.cpu().regs.a;
    let carry_in = mb.cpu().regs.f.contains(Flags::C);
    let (result, f) = match group {
        0 => add8(a, operand),
        1 => adc8(a, operand, carry_in),
        2 => sub8(a, operand),
        3 => sbc8(a, operand, carry_in),
        4 => and8(a, operand),
        5 => xor8(a, operand),
        6 => or8(a, operand),
        7 => sub8(a, operand), // CP: same flags as SUB, result discarded
        _ => unreachable!(),
    };
    mb.cpu_mut().regs.f = f;
    if group != 7 {
        mb.cpu_mut().regs.a = result;
    }
}

pub(super) fn flags_from(z: bool, n: bool, h: bool, c: bool) -> Flags {
    let mut f = Flags::empty();
    if z {
        f.insert(Flags::Z);
    }
    if n {
        f.insert(Flags::N);
    }
    if h {
        f.insert(Flags::H);
    }
    if c {
        f.insert(Flags::C);
    }
    f
}

fn add8(a: u8, b: u8) -> (u8, Flags) {
    let (result, carry) = a.overflowing_add(b);
    let h = (a & 0x0F) + (b & 0x0F) > 0x0F;
    (result, flags_from(result == 0, false, h, carry))
}

fn adc8(a: u8, b: u8, cin: bool) -> (u8, Flags) {
    let cin_u = cin as u8;
    let result = a.wrapping_add(b).wrapping_add(cin_u);
    let h = (a & 0x0F) + (b & 0x0F) + cin_u > 0x0F;
    let c = a as u16 + b as u16 + cin_u as u16 > 0xFF;
    (result, flags_from(result == 0, false, h, c))
}

fn sub8(a: u8, b: u8) -> (u8, Flags) {
    let result = a.wrapping_sub(b);
    let h = (a & 0x0F) < (b & 0x0F);
    let c = a < b;
    (result, flags_from(result == 0, true, h, c))
}

fn sbc8(a: u8, b: u8, cin: bool) -> (u8, Flags) {
    let cin_u = cin as u8;
    let result = a.wrapping_sub(b).wrapping_sub(cin_u);
    let h = (a & 0x0F) < (b & 0x0F) + cin_u;
    let c = (a as u16) < (b as u16) + (cin_u as u16);
    (result, flags_from(result == 0, true, h, c))
}

fn and8(a: u8, b: u8) -> (u8, Flags) {
    let r = a & b;
    (r, flags_from(r == 0, false, true, false))
}

fn xor8(a: u8, b: u8) -> (u8, Flags) {
    let r = a ^ b;
    (r, flags_from(r == 0, false, false, false))
}

fn or8(a: u8, b: u8) -> (u8, Flags) {
    let r = a | b;
    (r, flags_from(r == 0, false, false, false))
}

fn inc8(value: u8, old: Flags) -> (u8, Flags) {
    let result = value.wrapping_add(1);
    let h = (value & 0x0F) + 1 > 0x0F;
    let mut f = flags_from(result == 0, false, h, false);
    f.set(Flags::C, old.contains(Flags::C));
    (result, f)
}

fn dec8(value: u8, old: Flags) -> (u8, Flags) {
    let result = value.wrapping_sub(1);
    let h = value & 0x0F == 0;
    let mut f = flags_from(result == 0, true, h, false);
    f.set(Flags::C, old.contains(Flags::C));
    (result, f)
}

// ---- bit rotate/shift primitives, shared with the CB-prefixed table ----

pub(super) fn rlc(v: u8) -> (u8, bool) {
    (v.rotate_left(1), v & 0x80 != 0)
}

pub(super) fn rrc(v: u8) -> (u8, bool) {
    (v.rotate_right(1), v & 0x01 != 0)
}

pub(super) fn rl(v: u8, carry_in: bool) -> (u8, bool) {
    ((v << 1) | carry_in as u8, v & 0x80 != 0)
}

pub(super) fn rr(v: u8, carry_in: bool) -> (u8, bool) {
    ((v >> 1) | ((carry_in as u8) << 7), v & 0x01 != 0)
}

pub(super) fn sla(v: u8) -> (u8, bool) {
    (v << 1, v & 0x80 != 0)
}

pub(super) fn sra(v: u8) -> (u8, bool) {
    ((v >> 1) | (v & 0x80), v & 0x01 != 0)
}

pub(super) fn swap(v: u8) -> u8 {
    (v << 4) | (v >> 4)
}

pub(super) fn srl(v: u8) -> (u8, bool) {
    (v >> 1, v & 0x01 != 0)
}

fn rlca<T: WithCpu + Bus>(mb: &mut T) {
    let (r, c) = rlc(mb.cpu().regs.a);
    mb.cpu_mut().regs.a = r;
    mb.cpu_mut().regs.f = flags_from(false, false, false, c);
}

fn rrca<T: WithCpu + Bus>(mb: &mut T) {
    let (r, c) = rrc(mb.cpu().regs.a);
    mb.cpu_mut().regs.a = r;
    mb.cpu_mut().regs.f = flags_from(false, false, false, c);
}

fn rla<T: WithCpu + Bus>(mb: &mut T) {
    let carry_in = mb.cpu().regs.f.contains(Flags::C);
    let (r, c) = rl(mb.cpu().regs.a, carry_in);
    mb.cpu_mut().regs.a = r;
    mb.cpu_mut().regs.f = flags_from(false, false, false, c);
}

fn rra<T: WithCpu + Bus>(mb: &mut T) {
    let carry_in = mb.cpu().regs.f.contains(Flags::C);
    let (r, c) = rr(mb.cpu().regs.a, carry_in);
    mb.cpu_mut().regs.a = r;
    mb.cpu_mut().regs.f = flags_from(false, false, false, c);
}

/// Canonical DAA rule (§4.1, §9 "the source has at least two inconsistent
/// DAA variants; this spec gives the canonical rule").
fn daa<T: WithCpu + Bus>(mb: &mut T) {
    let mut a = mb.cpu().regs.a;
    let mut f = mb.cpu().regs.f;
    let mut adjust = 0u8;
    let mut carry = f.contains(Flags::C);
    if f.contains(Flags::N) {
        if f.contains(Flags::H) {
            adjust |= 0x06;
        }
        if carry {
            adjust |= 0x60;
        }
        a = a.wrapping_sub(adjust);
    } else {
        if f.contains(Flags::H) || a & 0x0F > 0x09 {
            adjust |= 0x06;
        }
        if carry || a > 0x99 {
            adjust |= 0x60;
            carry = true;
        }
        a = a.wrapping_add(adjust);
    }
    f.set(Flags::Z, a == 0);
    f.remove(Flags::H);
    f.set(Flags::C, carry);
    mb.cpu_mut().regs.a = a;
    mb.cpu_mut().regs.f = f;
}

fn cpl<T: WithCpu + Bus>(mb: &mut T) {
    let a = mb.cpu().regs.a;
    mb.cpu_mut().regs.a = !a;
    mb.cpu_mut().regs.f.insert(Flags::N);
    mb.cpu_mut().regs.f.insert(Flags::H);
}

fn scf<T: WithCpu + Bus>(mb: &mut T) {
    mb.cpu_mut().regs.f.remove(Flags::N);
    mb.cpu_mut().regs.f.remove(Flags::H);
    mb.cpu_mut().regs.f.insert(Flags::C);
}

fn ccf<T: WithCpu + Bus>(mb: &mut T) {
    let carry = mb.cpu().regs.f.contains(Flags::C);
    mb.cpu_mut().regs.f.remove(Flags::N);
    mb.cpu_mut().regs.f.remove(Flags::H);
    mb.cpu_mut().regs.f.set(Flags::C, !carry);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Harness {
        cpu: super::super::Cpu,
        mem: [u8; 0x10000],
    }

    impl Harness {
        fn new() -> Harness {
            Harness { cpu: super::super::Cpu::new(), mem: [0; 0x10000] }
        }
    }

    impl WithCpu for Harness {
        fn cpu(&self) -> &super::super::Cpu {
            &self.cpu
        }
        fn cpu_mut(&mut self) -> &mut super::super::Cpu {
            &mut self.cpu
        }
    }

    impl Bus for Harness {
        fn read(&mut self, addr: u16) -> u8 {
            self.mem[addr as usize]
        }
        fn write(&mut self, addr: u16, value: u8) {
            self.mem[addr as usize] = value;
        }
        fn peek(&self, addr: u16) -> u8 {
            self.mem[addr as usize]
        }
    }

    #[test]
    fn half_carry_on_add_matches_bit3_transition() {
        let mut h = Harness::new();
        h.cpu.regs.a = 0x0F;
        let (_, f) = add8(h.cpu.regs.a, 0x01);
        assert!(f.contains(Flags::H));
        let (_, f2) = add8(0x0E, 0x01);
        assert!(!f2.contains(Flags::H));
    }

    #[test]
    fn daa_after_add_from_spec_example() {
        let mut h = Harness::new();
        h.cpu.regs.a = 0x27;
        let (result, _) = add8(0x27, 0x15);
        h.cpu.regs.a = result;
        h.cpu.regs.f = flags_from(result == 0, false, (0x27 & 0x0F) + (0x15 & 0x0F) > 0x0F, false);
        daa(&mut h);
        assert_eq!(h.cpu.regs.a, 0x42);
        assert!(!h.cpu.regs.f.contains(Flags::N));
        assert!(!h.cpu.regs.f.contains(Flags::H));
    }

    #[test]
    fn jr_with_0xfe_from_0x1234_lands_on_0x1234() {
        let mut h = Harness::new();
        h.cpu.regs.pc = 0x1235; // as if the JR opcode byte at 0x1234 was already fetched
        h.mem[0x1235] = 0xFE;
        jr(&mut h);
        assert_eq!(h.cpu.regs.pc, 0x1234);
    }

    #[test]
    fn swap_twice_is_identity() {
        let v = 0xA5;
        assert_eq!(swap(swap(v)), v);
    }

    #[test]
    fn cpl_twice_restores_value_setting_n_and_h() {
        let mut h = Harness::new();
        h.cpu.regs.a = 0x3C;
        cpl(&mut h);
        cpl(&mut h);
        assert_eq!(h.cpu.regs.a, 0x3C);
        assert!(h.cpu.regs.f.contains(Flags::N));
        assert!(h.cpu.regs.f.contains(Flags::H));
    }

    #[test]
    fn unrecognized_opcode_sets_fault_but_keeps_clock_moving() {
        let mut h = Harness::new();
        let cycles = execute(&mut h, 0xD3);
        assert_eq!(cycles, 4);
        assert!(matches!(h.cpu.fault, Some(CoreError::UnrecognizedOpcode { .. })));
    }

    #[test]
    fn ld_r_r_basic_dispatch() {
        let mut h = Harness::new();
        h.cpu.regs.b = 0x99;
        execute(&mut h, 0x78); // LD A,B
        assert_eq!(h.cpu.regs.a, 0x99);
    }
}
