//! Key bindings (§6): Arrow keys -> D-pad, Z -> A, X -> B,
//! Right-Shift -> Select, Enter -> Start, Escape -> Quit.

use dmg_core::devices::joypad::Buttons;
use dmg_core::GameBoy;
use minifb::{Key, Window};

const BINDINGS: &[(Key, Buttons)] = &[
    (Key::Right, Buttons::RIGHT),
    (Key::Left, Buttons::LEFT),
    (Key::Up, Buttons::UP),
    (Key::Down, Buttons::DOWN),
    (Key::Z, Buttons::A),
    (Key::X, Buttons::B),
    (Key::RightShift, Buttons::SELECT),
    (Key::Enter, Buttons::START),
];

/// Poll every bound key and forward its up/down state to the joypad.
/// `GameBoy::set_button` is idempotent and only fires a joypad interrupt
/// on an edge, so calling this once per frame (rather than once per host
/// key event) is sufficient.
pub fn apply_input(gb: &mut GameBoy, window: &Window) {
    for &(key, button) in BINDINGS {
        gb.set_button(button, window.is_key_down(key));
    }
}

pub fn quit_requested(window: &Window) -> bool {
    window.is_key_down(Key::Escape)
}
