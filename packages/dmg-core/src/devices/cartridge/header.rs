//! Cartridge header parsing (§3 "Cartridge", §6 "Cartridge file").

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperKind {
    NoMbc,
    Mbc1,
    Mbc3,
}

#[derive(Debug, Clone)]
pub struct Header {
    pub title: String,
    pub mapper: MapperKind,
    pub has_ram: bool,
    pub has_battery: bool,
    pub has_rtc: bool,
    pub rom_banks: usize,
    pub ram_banks: usize,
}

fn rom_bank_count(code: u8) -> usize {
    2usize.pow(code as u32 + 1)
}

fn ram_bank_count(code: u8) -> usize {
    match code {
        0x02 => 1,
        0x03 => 4,
        0x04 => 16,
        0x05 => 8,
        _ => 0,
    }
}

impl Header {
    /// Parse and checksum-verify the 80-byte cartridge header (§6).
    pub fn parse(rom: &[u8]) -> Result<Header, CoreError> {
        if rom.len() < 0x150 {
            return Err(CoreError::RomInvalid(
                "file shorter than a valid header".into(),
            ));
        }

        let checksum_expected: u32 = rom[0x134..=0x14C]
            .iter()
            .fold(0u32, |acc, &b| acc.wrapping_sub(b as u32).wrapping_sub(1));
        let checksum_stored = rom[0x14D] as u32;
        if (checksum_expected & 0xFF) != checksum_stored {
            return Err(CoreError::RomInvalid(format!(
                "header checksum mismatch: expected {:#04X}, got {:#04X}",
                checksum_expected & 0xFF,
                checksum_stored
            )));
        }

        let title = String::from_utf8_lossy(&rom[0x134..0x144])
            .trim_end_matches('\0')
            .to_string();

        let cart_type = rom[0x147];
        let (mapper, has_ram, has_battery, has_rtc) = match cart_type {
            0x00 => (MapperKind::NoMbc, false, false, false),
            0x08 => (MapperKind::NoMbc, true, false, false),
            0x09 => (MapperKind::NoMbc, true, true, false),
            0x01 => (MapperKind::Mbc1, false, false, false),
            0x02 => (MapperKind::Mbc1, true, false, false),
            0x03 => (MapperKind::Mbc1, true, true, false),
            0x0F => (MapperKind::Mbc3, false, true, true),
            0x10 => (MapperKind::Mbc3, true, true, true),
            0x11 => (MapperKind::Mbc3, false, false, false),
            0x12 => (MapperKind::Mbc3, true, false, false),
            0x13 => (MapperKind::Mbc3, true, true, false),
            other => {
                return Err(CoreError::RomInvalid(format!(
                    "unsupported mapper type {other:#04X}"
                )))
            }
        };

        let rom_banks = rom_bank_count(rom[0x148]);
        if rom.len() < rom_banks * 0x4000 {
            return Err(CoreError::RomInvalid(
                "file shorter than declared ROM size".into(),
            ));
        }
        let ram_banks = ram_bank_count(rom[0x149]);

        Ok(Header {
            title,
            mapper,
            has_ram,
            has_battery,
            has_rtc,
            rom_banks,
            ram_banks,
        })
    }

    /// `saves/<lowercase-title-with-underscores>.sav` (§6).
    pub fn save_file_stem(&self) -> String {
        self.title
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rom(cart_type: u8, rom_code: u8, ram_code: u8, title: &[u8]) -> Vec<u8> {
        let mut rom = vec![0u8; 0x4000 * rom_bank_count(rom_code).max(2)];
        rom[0x134..0x134 + title.len()].copy_from_slice(title);
        rom[0x147] = cart_type;
        rom[0x148] = rom_code;
        rom[0x149] = ram_code;
        let checksum = rom[0x134..=0x14C]
            .iter()
            .fold(0u32, |acc, &b| acc.wrapping_sub(b as u32).wrapping_sub(1));
        rom[0x14D] = (checksum & 0xFF) as u8;
        rom
    }

    #[test]
    fn parses_valid_header() {
        let rom = make_rom(0x00, 0x00, 0x00, b"TESTROM");
        let h = Header::parse(&rom).unwrap();
        assert_eq!(h.title, "TESTROM");
        assert_eq!(h.mapper, MapperKind::NoMbc);
        assert_eq!(h.rom_banks, 2);
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut rom = make_rom(0x00, 0x00, 0x00, b"TESTROM");
        rom[0x14D] ^= 0xFF;
        assert!(Header::parse(&rom).is_err());
    }

    #[test]
    fn rejects_unsupported_mapper() {
        let rom = make_rom(0xFF, 0x00, 0x00, b"X");
        assert!(Header::parse(&rom).is_err());
    }

    #[test]
    fn mbc3_rtc_detected() {
        let rom = make_rom(0x10, 0x00, 0x02, b"RTCGAME");
        let h = Header::parse(&rom).unwrap();
        assert_eq!(h.mapper, MapperKind::Mbc3);
        assert!(h.has_rtc);
        assert!(h.has_battery);
    }

    #[test]
    fn save_stem_lowercases_and_underscores() {
        let rom = make_rom(0x00, 0x00, 0x00, b"MY GAME");
        let h = Header::parse(&rom).unwrap();
        assert_eq!(h.save_file_stem(), "my_game");
    }
}
