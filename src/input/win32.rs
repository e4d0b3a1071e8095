//! Windows input via `SendInput`.
//!
//! `SendInput` simulates hardware-level input, so the browser sees real
//! pointer events. It moves the actual cursor.

use anyhow::{Result, anyhow};

use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, INPUT, INPUT_0, INPUT_MOUSE, MOUSE_EVENT_FLAGS, MOUSEEVENTF_ABSOLUTE,
    MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE, MOUSEINPUT, SendInput,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN,
};

use super::{InputDriver, Key};

const VK_SPACE: i32 = 0x20;
const VK_ESCAPE: i32 = 0x1B;

/// Virtual-key code for a key. Letters and digits map to their uppercase ASCII code.
fn virtual_key(key: Key) -> i32 {
    match key {
        Key::Char(c) => c.to_ascii_uppercase() as i32,
        Key::Space => VK_SPACE,
        Key::Escape => VK_ESCAPE,
    }
}

fn mouse_input(dx: i32, dy: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                dwFlags: flags,
                ..Default::default()
            },
        },
    }
}

fn send(inputs: &[INPUT]) -> Result<()> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        return Err(anyhow!(
            "SendInput accepted {} of {} events",
            sent,
            inputs.len()
        ));
    }
    Ok(())
}

/// Input driver for the primary Windows desktop.
#[derive(Default)]
pub struct SendInputDriver;

impl SendInputDriver {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

impl InputDriver for SendInputDriver {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let screen_width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
        let screen_height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
        if screen_width <= 0 || screen_height <= 0 {
            return Err(anyhow!("Failed to read screen size"));
        }

        // Normalize to 0-65535 range (required by MOUSEEVENTF_ABSOLUTE)
        let norm_x = ((x as i64 * 65535) / screen_width as i64) as i32;
        let norm_y = ((y as i64 * 65535) / screen_height as i64) as i32;

        send(&[mouse_input(
            norm_x,
            norm_y,
            MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE,
        )])
    }

    fn click(&mut self) -> Result<()> {
        send(&[
            mouse_input(0, 0, MOUSEEVENTF_LEFTDOWN),
            mouse_input(0, 0, MOUSEEVENTF_LEFTUP),
        ])
    }

    fn is_key_pressed(&mut self, key: Key) -> Result<bool> {
        // High bit set = key currently down
        let state = unsafe { GetAsyncKeyState(virtual_key(key)) };
        Ok((state as u16) & 0x8000 != 0)
    }

    fn cursor_position(&mut self) -> Result<(i32, i32)> {
        let mut pt = POINT::default();
        unsafe {
            GetCursorPos(&mut pt)?;
        }
        Ok((pt.x, pt.y))
    }
}
