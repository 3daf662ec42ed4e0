//! C6: the four-channel sound unit and its frame sequencer (§4.6).

mod apu;
mod channels;

pub use apu::{step, Apu, WithApu};
