use anyhow::{Context, Result};
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, SetWindowsHookExW, UnhookWindowsHookEx, HHOOK, WH_KEYBOARD_LL, WM_KEYDOWN,
    WM_KEYUP, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

// nCode value carrying a real keyboard event
const HC_ACTION: i32 = 0;

// The hook is process-wide; at most one may be installed.
static HOOK: AtomicIsize = AtomicIsize::new(0);
static SWALLOWING: AtomicBool = AtomicBool::new(false);

/// Install the low-level keyboard hook
///
/// Returns `Ok(false)` when a hook is already installed. The hook only
/// receives events while the installing thread pumps messages, which the
/// window event loop does.
pub fn install() -> Result<bool> {
    if HOOK.load(Ordering::SeqCst) != 0 {
        return Ok(false);
    }

    let hook = unsafe {
        let module = GetModuleHandleW(PCWSTR::null()).context("Failed to get module handle")?;
        SetWindowsHookExW(
            WH_KEYBOARD_LL,
            Some(keyboard_proc),
            HINSTANCE(module.0),
            0,
        )
        .context("Failed to install keyboard hook")?
    };

    HOOK.store(hook.0 as isize, Ordering::SeqCst);
    SWALLOWING.store(true, Ordering::SeqCst);
    Ok(true)
}

/// Remove the hook if installed
///
/// Returns `Ok(false)` when there was nothing to remove. Swallowing stops
/// before the handle is released so no event is blocked after this returns.
pub fn uninstall() -> Result<bool> {
    SWALLOWING.store(false, Ordering::SeqCst);

    let raw = HOOK.swap(0, Ordering::SeqCst);
    if raw == 0 {
        return Ok(false);
    }

    unsafe { UnhookWindowsHookEx(HHOOK(raw as *mut c_void)) }
        .context("Failed to remove keyboard hook")?;
    Ok(true)
}

pub fn is_installed() -> bool {
    HOOK.load(Ordering::SeqCst) != 0
}

fn is_key_message(message: u32) -> bool {
    matches!(message, WM_KEYDOWN | WM_KEYUP | WM_SYSKEYDOWN | WM_SYSKEYUP)
}

/// Hook callback: swallow every key event while swallowing is on
unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION && SWALLOWING.load(Ordering::SeqCst) && is_key_message(wparam.0 as u32)
    {
        return LRESULT(1);
    }

    let hook = HHOOK(HOOK.load(Ordering::SeqCst) as *mut c_void);
    CallNextHookEx(hook, code, wparam, lparam)
}
