//! The host window (§6 "Framebuffer"). `minifb` owns the OS window and the
//! blit; we hand it the core's `u32` framebuffer directly since
//! `SHADE_TABLE` already packs each shade as `0xAARRGGBB`, which is what
//! minifb's `update_with_buffer` expects.

use std::time::Duration;

use dmg_core::{LCD_HEIGHT, LCD_WIDTH};
use minifb::{Scale, Window, WindowOptions};

use crate::error::HostError;

/// Picks the nearest `minifb::Scale` for an integer multiplier; minifb
/// only offers powers of two up to 8x, which covers every scale a CLI
/// user would reasonably ask for.
fn nearest_scale(multiplier: u32) -> Scale {
    match multiplier {
        0 | 1 => Scale::X1,
        2 => Scale::X2,
        3..=4 => Scale::X4,
        _ => Scale::X8,
    }
}

pub struct Display {
    window: Window,
}

impl Display {
    pub fn new(title: &str, scale: u32) -> Result<Display, HostError> {
        let options = WindowOptions {
            scale: nearest_scale(scale),
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, LCD_WIDTH, LCD_HEIGHT, options)
            .map_err(|e| HostError::Video(e.to_string()))?;
        // ~59.7 Hz: the DMG's real vertical refresh rate (§6).
        window.limit_update_rate(Some(Duration::from_micros(16_750)));
        Ok(Display { window })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn present(&mut self, framebuffer: &[u32]) -> Result<(), HostError> {
        self.window
            .update_with_buffer(framebuffer, LCD_WIDTH, LCD_HEIGHT)
            .map_err(|e| HostError::Video(e.to_string()))
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}
