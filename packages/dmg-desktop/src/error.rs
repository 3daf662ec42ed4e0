//! Host-side error kinds (§7): window, audio, and input failures all fold
//! into `dmg_core::CoreError::HostIoError` at the point they cross into
//! the emulator's error type, per the spec's `HostIoError` variant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("video error: {0}")]
    Video(String),
    #[error("audio error: {0}")]
    Audio(String),
    #[error("save error: {0}")]
    Save(String),
}

impl From<HostError> for dmg_core::CoreError {
    fn from(e: HostError) -> Self {
        dmg_core::CoreError::HostIoError(e.to_string())
    }
}
