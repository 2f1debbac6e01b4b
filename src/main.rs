// ReadFirst - mandatory rules screen
// Shows the rules, locks keyboard and pointer for the configured countdown,
// then lets the reader dismiss the window.

#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use log::info;
use readfirst::{config, content, ui, Config};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting ReadFirst v{}", VERSION);

    let base_dir = config::base_dir();
    let cfg = Config::load_or_default(&config::config_path());
    let rules_html = content::load_rules_html(&base_dir.join(&cfg.requirements_markdown));

    ui::window::run(cfg, rules_html).context("Failed to open rules window")
}
