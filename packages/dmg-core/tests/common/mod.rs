//! Shared synthetic-ROM scaffolding for the integration tests. None of
//! these builders attempt to satisfy `Header::parse`'s checksum — they go
//! straight through `Cartridge::new`, the same path the cartridge unit
//! tests use, so a test can hand-assemble machine code without also
//! hand-computing a valid header checksum.

use dmg_core::devices::cartridge::{Cartridge, Header, MapperKind};
use dmg_core::devices::cpu::WithCpu;
use dmg_core::GameBoy;

pub fn header(mapper: MapperKind, rom_banks: usize, ram_banks: usize) -> Header {
    Header {
        title: "TEST".into(),
        mapper,
        has_ram: ram_banks > 0,
        has_battery: ram_banks > 0,
        has_rtc: mapper == MapperKind::Mbc3,
        rom_banks,
        ram_banks,
    }
}

/// A `GameBoy` whose cartridge is plain ROM (no mapper) preloaded with
/// `program` starting at 0x0100, the post-boot-ROM entry point.
pub fn gameboy_with_program(program: &[u8]) -> GameBoy {
    let mut rom = vec![0u8; 0x8000];
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    let cart = Cartridge::new(header(MapperKind::NoMbc, 2, 0), rom);
    GameBoy::new(cart)
}

/// Run until the CPU executes a `HALT`, faults, or `max_steps` is
/// exceeded, returning the number of steps actually taken.
pub fn run_until_halted(gb: &mut GameBoy, max_steps: usize) -> usize {
    for i in 0..max_steps {
        if gb.fault().is_some() || gb.cpu().halted {
            return i;
        }
        gb.step();
    }
    max_steps
}
