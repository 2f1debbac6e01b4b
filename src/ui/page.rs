//! HTML document shown in the rules window
//!
//! The page is static apart from two hooks the host drives through script
//! evaluation: the status line and the dismiss button state. The page
//! reports back over the webview IPC channel with [`PageMessage`].

use crate::config::Config;
use crate::constants::{intro_status, DISMISS_LABEL};
use log::warn;

/// Messages posted by the page to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMessage {
    /// Document finished loading; host state should be re-applied
    Ready,
    /// Dismiss button clicked
    Dismiss,
}

impl PageMessage {
    pub fn parse(body: &str) -> Option<Self> {
        match body.trim() {
            "ready" => Some(Self::Ready),
            "dismiss" => Some(Self::Dismiss),
            _ => None,
        }
    }
}

/// Build the complete document around the pre-rendered rules fragment
pub fn build_page(config: &Config, rules_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  html, body {{ margin: 0; height: 100%; overflow: hidden; }}
  body {{
    display: flex;
    flex-direction: column;
    font-family: "Microsoft YaHei", "PingFang SC", "Noto Sans CJK SC", sans-serif;
    user-select: none;
  }}
  #rules {{ flex: 1; overflow-y: auto; padding: 8px; font-size: {font}pt; }}
  #status {{ text-align: center; padding: 6px 8px; }}
  #dismiss {{ margin: 0 8px 8px; padding: 8px; font-size: {font}pt; }}
</style>
</head>
<body>
<div id="rules">{rules}</div>
<div id="status">{status}</div>
<button id="dismiss" disabled>{label}</button>
<script>
  window.readfirst = {{
    setStatus: function (text) {{
      document.getElementById('status').textContent = text;
    }},
    setDismissEnabled: function (enabled) {{
      document.getElementById('dismiss').disabled = !enabled;
    }}
  }};
  document.getElementById('dismiss').addEventListener('click', function () {{
    window.ipc.postMessage('dismiss');
  }});
  document.addEventListener('contextmenu', function (e) {{ e.preventDefault(); }});
  window.addEventListener('DOMContentLoaded', function () {{
    window.ipc.postMessage('ready');
  }});
</script>
</body>
</html>
"#,
        title = escape_html(&config.title),
        font = config.font_point_size,
        rules = rules_html,
        status = escape_html(&intro_status(config.lock_seconds)),
        label = escape_html(DISMISS_LABEL),
    )
}

/// Script that updates the status line
pub fn set_status_script(text: &str) -> String {
    format!("window.readfirst.setStatus({});", js_string(text))
}

/// Script that enables or disables the dismiss button
pub fn set_dismiss_script(enabled: bool) -> String {
    format!("window.readfirst.setDismissEnabled({});", enabled)
}

/// Quote `text` as a JavaScript string literal
fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|e| {
        warn!("Failed to encode status text: {}", e);
        "\"\"".to_string()
    })
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
