//! Battery-backed save format (§4.3, §6): RAM bytes, the running and
//! latched RTC, and a host-clock timestamp of the last save, so that the
//! RTC can be re-anchored to wall-clock time on load.

use serde::{Deserialize, Serialize};

use super::mappers::Cartridge;
use super::rtc::Rtc;
use crate::error::CoreError;

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveFile {
    pub ram: Vec<u8>,
    pub rtc: Option<Rtc>,
    /// Unix timestamp (seconds) at save time; `None` if the cartridge has
    /// no RTC, since there is nothing to re-anchor.
    pub saved_at_unix: Option<u64>,
}

impl SaveFile {
    pub fn capture(cart: &Cartridge, saved_at_unix: Option<u64>) -> SaveFile {
        SaveFile {
            ram: cart.ram_bytes().to_vec(),
            rtc: cart.rtc().cloned(),
            saved_at_unix,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).expect("SaveFile serialization is infallible")
    }

    pub fn decode(bytes: &[u8]) -> Result<SaveFile, CoreError> {
        bincode::deserialize(bytes).map_err(|e| CoreError::SaveCorrupt(e.to_string()))
    }

    /// Restore RAM and RTC state onto a freshly-constructed cartridge.
    /// `now_unix` is used to compute wall-clock drift for the RTC, per
    /// §4.3 ("RTC continues as if the console had stayed on").
    pub fn apply(self, cart: &mut Cartridge, now_unix: u64) {
        let ram = cart.ram_bytes_mut();
        let n = ram.len().min(self.ram.len());
        ram[..n].copy_from_slice(&self.ram[..n]);

        if let (Some(saved_rtc), Some(saved_at)) = (self.rtc, self.saved_at_unix) {
            if let Some(rtc) = cart.rtc_mut() {
                *rtc = saved_rtc;
                let elapsed = now_unix.saturating_sub(saved_at);
                rtc.catch_up(elapsed);
            }
        }
    }
}
