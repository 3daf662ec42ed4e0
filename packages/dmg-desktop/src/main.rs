//! Native desktop frontend (§6 "External interfaces"): parses the CLI,
//! opens a window and audio stream, and drives `dmg_core::GameBoy` one
//! frame at a time until the user quits or an unrecoverable error occurs.

mod audio;
mod error;
mod input;
mod save;
mod video;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dmg_core::GameBoy;

use audio::AudioOutput;
use video::Display;

/// A cycle-accurate handheld console emulator.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the ROM image to load.
    #[arg(long)]
    rom: PathBuf,

    /// Window scale multiplier.
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Log level, as accepted by `RUST_LOG` (overrides the environment
    /// variable if both are set).
    #[arg(short = 'l', long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.init();
}

fn run(args: &Args) -> Result<(), dmg_core::CoreError> {
    let rom = std::fs::read(&args.rom)
        .map_err(|e| dmg_core::CoreError::HostIoError(format!("reading {:?}: {e}", args.rom)))?;

    let mut gb = GameBoy::from_rom(rom)?;
    save::load(&mut gb, &args.rom);

    let title = format!("dmg-desktop — {}", gb.cartridge().header.title);
    let mut display = Display::new(&title, args.scale)?;
    let audio = AudioOutput::open()?;
    audio.set_volume(0.25);

    while display.is_open() {
        gb.step_frame();

        if let Some(err) = gb.fault() {
            log::error!("halted: {err}");
            break;
        }

        display.present(gb.take_frame())?;
        audio.push_samples(gb.take_audio_samples());

        input::apply_input(&mut gb, display.window());
        if input::quit_requested(display.window()) {
            break;
        }
    }

    save::save(&gb, &args.rom)?;
    Ok(())
}
