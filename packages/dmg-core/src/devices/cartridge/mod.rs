//! C2: cartridge header parsing, mapper variants, RTC, and the
//! battery-save format (§3, §4.3, §6).

mod header;
mod mappers;
mod rtc;
mod save;

pub use header::{Header, MapperKind};
pub use mappers::{Cartridge, ResolvedAccess};
pub use rtc::{Rtc, RtcRegisters};
pub use save::SaveFile;

use crate::error::CoreError;

impl Cartridge {
    /// Parse and construct a cartridge from a raw ROM image (§6).
    pub fn from_bytes(rom: Vec<u8>) -> Result<Cartridge, CoreError> {
        let header = Header::parse(&rom)?;
        log::debug!(
            "loaded cartridge {:?} mapper={:?} rom_banks={} ram_banks={}",
            header.title,
            header.mapper,
            header.rom_banks,
            header.ram_banks
        );
        Ok(Cartridge::new(header, rom))
    }
}

pub trait WithCartridge {
    fn cartridge(&self) -> &Cartridge;
    fn cartridge_mut(&mut self) -> &mut Cartridge;
}
