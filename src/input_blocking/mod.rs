//! Input-lock capability
//!
//! All platform calls that affect input machine-wide live behind
//! [`InputLock`]. Windows gets a real implementation (low-level keyboard
//! hook, cursor positioning and visibility); every other platform gets
//! [`InertInputLock`], which accepts every call and does nothing.
//!
//! Every operation is best-effort. Callers log failures and carry on; the
//! enforcement state machine must never stall because input could not be
//! physically blocked.

#[cfg(windows)]
pub mod cursor;
#[cfg(windows)]
pub mod keyboard_hook;

use anyhow::Result;

/// A rectangle in physical screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Geometric center, rounded toward the origin
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    /// Top-left corner that centers a `width` x `height` box in this rect
    ///
    /// A box larger than the rect ends up with a negative offset so that it
    /// still overhangs evenly on both sides.
    pub fn centered_origin(&self, width: u32, height: u32) -> (i32, i32) {
        (
            self.x + (self.width as i32 - width as i32) / 2,
            self.y + (self.height as i32 - height as i32) / 2,
        )
    }
}

/// Platform operations used while the rules window is locked
pub trait InputLock {
    /// Begin swallowing keystrokes machine-wide. No-op when already installed.
    fn install(&mut self) -> Result<()>;

    /// Stop swallowing keystrokes and release the interception handle.
    /// Safe to call when nothing is installed.
    fn uninstall(&mut self) -> Result<()>;

    /// Whether keystroke interception is currently installed
    fn is_installed(&self) -> bool;

    /// Move the system pointer to `(x, y)` in screen coordinates
    fn pin_pointer(&mut self, x: i32, y: i32) -> Result<()>;

    /// Show or hide the system pointer. Repeated calls with the same value
    /// are no-ops.
    fn set_pointer_visible(&mut self, visible: bool) -> Result<()>;

    /// Available area of the primary screen (excluding task bars), when the
    /// platform can report it
    fn primary_work_area(&self) -> Option<ScreenRect> {
        None
    }
}

/// Capability for platforms without input locking
///
/// Tracks the requested state so callers observe consistent answers, but
/// never touches the system.
#[derive(Debug, Default)]
pub struct InertInputLock {
    installed: bool,
}

impl InertInputLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputLock for InertInputLock {
    fn install(&mut self) -> Result<()> {
        self.installed = true;
        Ok(())
    }

    fn uninstall(&mut self) -> Result<()> {
        self.installed = false;
        Ok(())
    }

    fn is_installed(&self) -> bool {
        self.installed
    }

    fn pin_pointer(&mut self, _x: i32, _y: i32) -> Result<()> {
        Ok(())
    }

    fn set_pointer_visible(&mut self, _visible: bool) -> Result<()> {
        Ok(())
    }
}

/// Win32 implementation: WH_KEYBOARD_LL hook plus cursor control
#[cfg(windows)]
#[derive(Debug, Default)]
pub struct WindowsInputLock {
    pointer_hidden: bool,
}

#[cfg(windows)]
impl WindowsInputLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(windows)]
impl InputLock for WindowsInputLock {
    fn install(&mut self) -> Result<()> {
        if keyboard_hook::install()? {
            log::info!("Keyboard hook installed");
        }
        Ok(())
    }

    fn uninstall(&mut self) -> Result<()> {
        if keyboard_hook::uninstall()? {
            log::info!("Keyboard hook removed");
        }
        Ok(())
    }

    fn is_installed(&self) -> bool {
        keyboard_hook::is_installed()
    }

    fn pin_pointer(&mut self, x: i32, y: i32) -> Result<()> {
        cursor::set_position(x, y)
    }

    fn set_pointer_visible(&mut self, visible: bool) -> Result<()> {
        // ShowCursor keeps a display counter; only pair transitions
        if visible == !self.pointer_hidden {
            return Ok(());
        }
        cursor::set_visible(visible);
        self.pointer_hidden = !visible;
        Ok(())
    }

    fn primary_work_area(&self) -> Option<ScreenRect> {
        cursor::primary_work_area()
    }
}

#[cfg(windows)]
impl Drop for WindowsInputLock {
    fn drop(&mut self) {
        let _ = self.uninstall();
        let _ = self.set_pointer_visible(true);
    }
}

#[cfg(windows)]
pub use WindowsInputLock as NativeInputLock;

#[cfg(not(windows))]
pub use InertInputLock as NativeInputLock;
