//! Error kinds for the emulation core, per the component-level recovery
//! rules: most bus-level misses are silently absorbed (0xFF / dropped
//! write), only the cases below ever bubble up to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid ROM: {0}")]
    RomInvalid(String),

    #[error("save file corrupt: {0}")]
    SaveCorrupt(String),

    #[error("unrecognized opcode {opcode:#04X} at PC={pc:#06X}")]
    UnrecognizedOpcode { pc: u16, opcode: u8 },

    #[error("host I/O error: {0}")]
    HostIoError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
