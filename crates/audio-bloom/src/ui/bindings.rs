//! Keyboard bindings and input handling.

use nannou::prelude::*;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// Start the visualizer, or fade it out if it is running
    TogglePlayback,
    /// Switch capture device (0-9, Shift adds 10)
    SelectDevice(usize),
}

fn digit(key: Key) -> Option<usize> {
    let d = match key {
        Key::Key0 => 0,
        Key::Key1 => 1,
        Key::Key2 => 2,
        Key::Key3 => 3,
        Key::Key4 => 4,
        Key::Key5 => 5,
        Key::Key6 => 6,
        Key::Key7 => 7,
        Key::Key8 => 8,
        Key::Key9 => 9,
        _ => return None,
    };
    Some(d)
}

/// Parse a key press into an action
pub fn parse_key(key: Key, shift: bool) -> Option<Action> {
    if let Some(d) = digit(key) {
        let offset = if shift { 10 } else { 0 };
        return Some(Action::SelectDevice(d + offset));
    }

    match key {
        Key::Q | Key::Escape => Some(Action::Quit),
        Key::Space => Some(Action::TogglePlayback),
        _ => None,
    }
}
