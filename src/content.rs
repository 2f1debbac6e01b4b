//! Rules content rendering
//!
//! Turns the markdown rules file into the HTML fragment shown in the window.
//! Rendering happens once at startup; the result is never mutated.

use crate::constants::{DATE_LINE, HEADING_STYLE, RULES_NOT_FOUND_HTML, SIGNATURE_LINE};
use anyhow::{Context, Result};
use log::{info, warn};
use pulldown_cmark::{html, Parser};
use std::fs;
use std::path::Path;

/// Load the rules file at `path` and render it, or return the placeholder
///
/// A missing or unreadable file never aborts startup.
pub fn load_rules_html(path: &Path) -> String {
    if !path.exists() {
        warn!("Rules file not found: {}", path.display());
        return RULES_NOT_FOUND_HTML.to_string();
    }

    match read_rules(path) {
        Ok(markdown) => {
            info!("Rules loaded from: {}", path.display());
            render_rules(&markdown)
        }
        Err(e) => {
            warn!("{:#}", e);
            RULES_NOT_FOUND_HTML.to_string()
        }
    }
}

fn read_rules(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file: {}", path.display()))
}

/// Render markdown and apply the fixed styling
///
/// The signature and date paragraphs are right-aligned only when they
/// appear verbatim as their own paragraph. The heading style is always
/// prepended.
pub fn render_rules(markdown: &str) -> String {
    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, Parser::new(markdown));

    let body = right_align_paragraph(&body, SIGNATURE_LINE);
    let body = right_align_paragraph(&body, DATE_LINE);

    format!("{}{}", HEADING_STYLE, body)
}

fn right_align_paragraph(html: &str, line: &str) -> String {
    html.replace(
        &format!("<p>{}</p>", line),
        &format!(r#"<p style="text-align: right;">{}</p>"#, line),
    )
}
