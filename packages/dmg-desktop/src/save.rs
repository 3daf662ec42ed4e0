//! Battery save persistence (§4.3, §6): `saves/<stem>.sav` next to the ROM.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use dmg_core::devices::cartridge::{SaveFile, WithCartridge};
use dmg_core::GameBoy;

use crate::error::HostError;

fn save_path(rom_path: &Path, stem: &str) -> PathBuf {
    let dir = rom_path.parent().unwrap_or_else(|| Path::new(".")).join("saves");
    dir.join(format!("{stem}.sav"))
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Load a save file for this cartridge, if one exists, applying it to the
/// freshly-constructed `GameBoy`. A missing file is not an error; a
/// corrupt one is logged and skipped, leaving RAM zeroed (§7 `SaveCorrupt`).
pub fn load(gb: &mut GameBoy, rom_path: &Path) {
    let stem = gb.cartridge().header.save_file_stem();
    let path = save_path(rom_path, &stem);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(_) => return,
    };
    match SaveFile::decode(&bytes) {
        Ok(save) => save.apply(gb.cartridge_mut(), now_unix()),
        Err(e) => log::warn!("discarding corrupt save {}: {e}", path.display()),
    }
}

/// Snapshot RAM/RTC and write it out, per §5's cancellation contract
/// ("on termination, the cartridge writes any battery-backed RAM").
pub fn save(gb: &GameBoy, rom_path: &Path) -> Result<(), HostError> {
    if !gb.cartridge().header.has_battery {
        return Ok(());
    }
    let stem = gb.cartridge().header.save_file_stem();
    let path = save_path(rom_path, &stem);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| HostError::Save(e.to_string()))?;
    }
    let snapshot = SaveFile::capture(gb.cartridge(), Some(now_unix()));
    fs::write(&path, snapshot.encode()).map_err(|e| HostError::Save(e.to_string()))?;
    log::info!("wrote save to {}", path.display());
    Ok(())
}
