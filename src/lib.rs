// Library interface for ReadFirst
// This allows tests and the binary to access the crate's functionality

pub mod config;
pub mod constants;
pub mod content;
pub mod enforcement;
pub mod input_blocking;
pub mod schedule;
pub mod ui;

pub use config::Config;
pub use enforcement::{CloseDecision, DismissOutcome, Enforcement, EnforcementView, Phase};
pub use input_blocking::{InertInputLock, InputLock, NativeInputLock, ScreenRect};
