//! Win32 pointer control and screen geometry

use super::ScreenRect;
use anyhow::{Context, Result};
use std::ffi::c_void;
use windows::Win32::Foundation::{BOOL, RECT};
use windows::Win32::UI::WindowsAndMessaging::{
    SetCursorPos, ShowCursor, SystemParametersInfoW, SPI_GETWORKAREA,
    SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
};

pub fn set_position(x: i32, y: i32) -> Result<()> {
    unsafe { SetCursorPos(x, y) }.context("Failed to move cursor")
}

/// Adjust the cursor display counter; returns the new counter value
pub fn set_visible(visible: bool) -> i32 {
    unsafe { ShowCursor(BOOL::from(visible)) }
}

/// Work area of the primary monitor in physical pixels
pub fn primary_work_area() -> Option<ScreenRect> {
    let mut rect = RECT::default();
    unsafe {
        SystemParametersInfoW(
            SPI_GETWORKAREA,
            0,
            Some(&mut rect as *mut RECT as *mut c_void),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
    }
    .ok()?;

    let width = u32::try_from(rect.right - rect.left).ok()?;
    let height = u32::try_from(rect.bottom - rect.top).ok()?;
    Some(ScreenRect::new(rect.left, rect.top, width, height))
}
