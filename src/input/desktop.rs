//! Input for non-Windows desktops: enigo moves and clicks, device_query reads keys.

use anyhow::{Context, Result, anyhow};
use device_query::{DeviceQuery, DeviceState, Keycode};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};

use super::{InputDriver, Key};

pub struct DesktopInput {
    enigo: Enigo,
    device: DeviceState,
}

impl DesktopInput {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).context("Failed to connect input backend")?;
        Ok(Self {
            enigo,
            device: DeviceState::new(),
        })
    }
}

fn keycode(key: Key) -> Result<Keycode> {
    let code = match key {
        Key::Space => Keycode::Space,
        Key::Escape => Keycode::Escape,
        Key::Char(c) => match c.to_ascii_lowercase() {
            'a' => Keycode::A,
            'b' => Keycode::B,
            'c' => Keycode::C,
            'd' => Keycode::D,
            'e' => Keycode::E,
            'f' => Keycode::F,
            'g' => Keycode::G,
            'h' => Keycode::H,
            'i' => Keycode::I,
            'j' => Keycode::J,
            'k' => Keycode::K,
            'l' => Keycode::L,
            'm' => Keycode::M,
            'n' => Keycode::N,
            'o' => Keycode::O,
            'p' => Keycode::P,
            'q' => Keycode::Q,
            'r' => Keycode::R,
            's' => Keycode::S,
            't' => Keycode::T,
            'u' => Keycode::U,
            'v' => Keycode::V,
            'w' => Keycode::W,
            'x' => Keycode::X,
            'y' => Keycode::Y,
            'z' => Keycode::Z,
            '0' => Keycode::Key0,
            '1' => Keycode::Key1,
            '2' => Keycode::Key2,
            '3' => Keycode::Key3,
            '4' => Keycode::Key4,
            '5' => Keycode::Key5,
            '6' => Keycode::Key6,
            '7' => Keycode::Key7,
            '8' => Keycode::Key8,
            '9' => Keycode::Key9,
            other => return Err(anyhow!("No keycode for '{}'", other)),
        },
    };
    Ok(code)
}

impl InputDriver for DesktopInput {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .with_context(|| format!("Failed to move pointer to ({}, {})", x, y))
    }

    fn click(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .context("Failed to click")
    }

    fn is_key_pressed(&mut self, key: Key) -> Result<bool> {
        let code = keycode(key)?;
        Ok(self.device.get_keys().contains(&code))
    }

    fn cursor_position(&mut self) -> Result<(i32, i32)> {
        Ok(self.device.get_mouse().coords)
    }
}
