//! Pointer and keyboard access.
//!
//! The clicker only talks to the `InputDriver` trait. Backends:
//! - Windows: `SendInput` / `GetAsyncKeyState` via the windows crate
//! - Other desktops (`desktop` feature): enigo for the pointer, device_query for keys

#[cfg(all(not(windows), feature = "desktop"))]
pub mod desktop;
#[cfg(windows)]
pub mod win32;

use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[cfg(all(not(windows), feature = "desktop"))]
pub use desktop::DesktopInput as NativeInput;
#[cfg(windows)]
pub use win32::SendInputDriver as NativeInput;

/// Poll period of the default `wait_for_key`.
const KEY_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error, PartialEq)]
#[error("unknown key name '{0}' (expected a letter, a digit, 'space' or 'esc')")]
pub struct KeyParseError(pub String);

/// A key the tool can poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Lowercase ASCII letter or digit
    Char(char),
    Space,
    Escape,
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "space" => return Ok(Key::Space),
            "esc" | "escape" => return Ok(Key::Escape),
            _ => {}
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => Ok(Key::Char(c)),
            _ => Err(KeyParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::Space => write!(f, "Space"),
            Key::Escape => write!(f, "Esc"),
        }
    }
}

/// Moves the pointer, clicks, and reads key state.
pub trait InputDriver {
    /// Jumps the pointer to absolute screen coordinates, no animation.
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Left click at the current pointer position.
    fn click(&mut self) -> Result<()>;

    fn is_key_pressed(&mut self, key: Key) -> Result<bool>;

    fn cursor_position(&mut self) -> Result<(i32, i32)>;

    /// Blocks until `key` is pressed.
    fn wait_for_key(&mut self, key: Key) -> Result<()> {
        while !self.is_key_pressed(key)? {
            std::thread::sleep(KEY_POLL_INTERVAL);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!("q".parse(), Ok(Key::Char('q')));
        assert_eq!(" F ".parse(), Ok(Key::Char('f')));
        assert_eq!("7".parse(), Ok(Key::Char('7')));
        assert_eq!("Space".parse(), Ok(Key::Space));
        assert_eq!("ESC".parse(), Ok(Key::Escape));
        assert_eq!("escape".parse(), Ok(Key::Escape));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("".parse::<Key>().is_err());
        assert!("qq".parse::<Key>().is_err());
        assert!("ctrl".parse::<Key>().is_err());
        assert_eq!("é".parse::<Key>(), Err(KeyParseError("é".to_string())));
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::Char('q').to_string(), "Q");
        assert_eq!(Key::Escape.to_string(), "Esc");
    }
}
