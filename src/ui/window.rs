//! Rules window: a tao event loop hosting a wry webview
//!
//! Everything runs on the main thread. The enforcement state machine is
//! driven from the event loop callback; its periodic tasks are realized by
//! sleeping the loop with `ControlFlow::WaitUntil` until the next task is due.

use crate::config::Config;
use crate::constants::intro_status;
use crate::enforcement::{DismissOutcome, Enforcement, EnforcementView};
use crate::input_blocking::{NativeInputLock, ScreenRect};
use crate::ui::page::{self, PageMessage};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::Instant;
use tao::dpi::{LogicalSize, PhysicalPosition};
use tao::event::{Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use tao::window::{Window, WindowBuilder};
use wry::http::Request;
use wry::{WebView, WebViewBuilder};

#[derive(Debug, Clone, Copy)]
enum UserEvent {
    Page(PageMessage),
}

/// The window surface the state machine drives
struct RulesWindow {
    window: Window,
    webview: WebView,
    // Last requested page state, re-applied once the page reports ready
    status: String,
    dismiss_enabled: bool,
}

impl RulesWindow {
    fn run_script(&self, script: &str) {
        if let Err(e) = self.webview.evaluate_script(script) {
            debug!("Script evaluation failed: {}", e);
        }
    }

    fn sync_page(&self) {
        self.run_script(&page::set_status_script(&self.status));
        self.run_script(&page::set_dismiss_script(self.dismiss_enabled));
    }
}

impl EnforcementView for RulesWindow {
    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
        self.run_script(&page::set_status_script(text));
    }

    fn set_dismiss_enabled(&mut self, enabled: bool) {
        self.dismiss_enabled = enabled;
        self.run_script(&page::set_dismiss_script(enabled));
    }

    fn raise_to_top(&mut self) {
        self.window.set_always_on_top(true);
        self.window.set_focus();
    }

    fn restore(&mut self) {
        self.window.set_minimized(false);
    }

    fn center_in(&mut self, area: ScreenRect) {
        let size = self.window.outer_size();
        let (x, y) = area.centered_origin(size.width, size.height);
        self.window.set_outer_position(PhysicalPosition::new(x, y));
    }

    /// Full bounds of the primary monitor. tao exposes no work area, so this
    /// approximates the available area by including any taskbar or dock.
    fn primary_screen_area(&self) -> Option<ScreenRect> {
        let monitor = self.window.primary_monitor()?;
        let position = monitor.position();
        let size = monitor.size();
        Some(ScreenRect::new(position.x, position.y, size.width, size.height))
    }
}

/// Open the rules window and run until dismissed
///
/// Only returns on a setup failure; a dismissal exits the process with
/// status 0 from inside the event loop.
pub fn run(config: Config, rules_html: String) -> Result<()> {
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ))
        .with_resizable(false)
        .with_minimizable(false)
        .with_maximizable(false)
        .with_always_on_top(true)
        .build(&event_loop)
        .context("Failed to create window")?;

    let html = page::build_page(&config, &rules_html);
    let webview = build_webview(&window, html, proxy)?;

    let mut view = RulesWindow {
        window,
        webview,
        status: intro_status(config.lock_seconds),
        dismiss_enabled: false,
    };
    let mut enforcement = Enforcement::new(config.lock_seconds, NativeInputLock::new());

    info!("Rules window created ({}x{})", config.window.width, config.window.height);

    event_loop.run(move |event, _, control_flow| {
        if let Event::LoopDestroyed = event {
            enforcement.shutdown();
            return;
        }
        if enforcement.is_dismissed() {
            *control_flow = ControlFlow::Exit;
            return;
        }

        match event {
            Event::NewEvents(StartCause::Init) => enforcement.begin(Instant::now(), &mut view),
            Event::NewEvents(_) => enforcement.on_timers(Instant::now(), &mut view),
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                enforcement.on_close_requested(&mut view);
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(_) | WindowEvent::Focused(_),
                ..
            } => {
                if view.window.is_minimized() {
                    enforcement.on_minimized(&mut view);
                }
            }
            Event::UserEvent(UserEvent::Page(PageMessage::Ready)) => view.sync_page(),
            Event::UserEvent(UserEvent::Page(PageMessage::Dismiss)) => {
                if enforcement.dismiss() == DismissOutcome::Exit {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }
            _ => {}
        }

        *control_flow = match enforcement.next_wakeup() {
            Some(at) => ControlFlow::WaitUntil(at),
            None => ControlFlow::Wait,
        };
    })
}

fn build_webview(window: &Window, html: String, proxy: EventLoopProxy<UserEvent>) -> Result<WebView> {
    webview_builder(window)?
        .with_html(html)
        .with_ipc_handler(move |request: Request<String>| {
            match PageMessage::parse(request.body()) {
                Some(message) => {
                    if let Err(e) = proxy.send_event(UserEvent::Page(message)) {
                        warn!("Failed to forward page message: {}", e);
                    }
                }
                None => warn!("Unknown page message: {:?}", request.body()),
            }
        })
        .build()
        .context("Failed to create webview")
}

#[cfg(any(target_os = "windows", target_os = "macos"))]
fn webview_builder(window: &Window) -> Result<WebViewBuilder<'_>> {
    Ok(WebViewBuilder::new(window))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn webview_builder(window: &Window) -> Result<WebViewBuilder<'_>> {
    use tao::platform::unix::WindowExtUnix;
    use wry::WebViewBuilderExtUnix;

    let vbox = window
        .default_vbox()
        .context("Window has no GTK container for the webview")?;
    Ok(WebViewBuilder::new_gtk(vbox))
}
