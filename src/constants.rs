//! Centralized constants for ReadFirst
//!
//! This module contains all configurable numerical values and every fixed
//! user-facing string. Each numeric constant includes documentation on its
//! purpose, unit, and recommended value range.

// ============================================================================
// CONFIGURATION DEFAULTS
// ============================================================================

/// File name of the optional JSON override, looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default countdown before the dismiss button unlocks.
/// Unit: seconds
/// Range: LOCK_MIN_SECONDS..=LOCK_MAX_SECONDS
pub const LOCK_DEFAULT_SECONDS: u64 = 5;

/// Smallest countdown accepted; lower configured values are raised to this.
/// Unit: seconds
/// Range: Fixed minimum, a zero-length lock would skip enforcement entirely
pub const LOCK_MIN_SECONDS: u64 = 1;

/// Largest countdown accepted; higher configured values are lowered to this.
/// Unit: seconds
/// Range: Fixed maximum (24 hours), keeps the deadline representable
pub const LOCK_MAX_SECONDS: u64 = 86_400;

/// Default fixed window width.
/// Unit: logical pixels
pub const WINDOW_DEFAULT_WIDTH: u32 = 900;

/// Default fixed window height.
/// Unit: logical pixels
pub const WINDOW_DEFAULT_HEIGHT: u32 = 600;

/// Default body text size of the rules area.
/// Unit: points
/// Recommended range: 10-18
pub const FONT_DEFAULT_POINT_SIZE: u32 = 12;

/// Default rules source, relative to the executable directory.
pub const RULES_DEFAULT_PATH: &str = "rules.md";

// ============================================================================
// TICK INTERVALS
// ============================================================================

/// Pointer re-pin interval while locked.
/// Unit: milliseconds
/// Recommended range: 5-20 (lower = pointer looks more immobile, higher = less CPU)
pub const POINTER_REPIN_INTERVAL_MS: u64 = 10;

/// Countdown re-evaluation interval while locked.
/// Unit: milliseconds
/// Recommended range: 100-500 (must stay well under 1000 to keep the
/// displayed second from lagging the deadline)
pub const COUNTDOWN_TICK_INTERVAL_MS: u64 = 250;

// ============================================================================
// EMBEDDED STRINGS
// ============================================================================

/// Window title used when the config does not override it.
pub const DEFAULT_TITLE: &str = "电子阅览室规章制度";

/// Markup shown in place of the rules when the source file is missing.
pub const RULES_NOT_FOUND_HTML: &str = "<p>规则内容未找到。</p>";

/// Signature line that gets right-aligned when present verbatim.
pub const SIGNATURE_LINE: &str = "桂林中学图书馆";

/// Date line that gets right-aligned when present verbatim.
pub const DATE_LINE: &str = "2025年10月1日";

/// Style block prepended to every rendered document.
pub const HEADING_STYLE: &str = "<style>\n    h1 { text-align: center; }\n</style>\n";

/// Label of the dismiss button.
pub const DISMISS_LABEL: &str = "我已阅读并且同意遵守该规定，关闭窗口";

/// Status text shown before enforcement starts.
pub fn intro_status(lock_seconds: u64) -> String {
    format!("请认真阅读，上述内容将显示 {} 秒，期间键鼠被限制…", lock_seconds)
}

/// Status text shown while the countdown runs.
pub fn countdown_status(remaining_seconds: u64) -> String {
    format!(
        "请认真阅读（{} 秒后可关闭），期间键盘与鼠标移动被限制。",
        remaining_seconds
    )
}

/// Status text shown once the dismiss button is enabled.
pub const RELEASED_STATUS: &str = "阅读时间到，您可以关闭窗口。";
