pub mod page;
#[cfg(feature = "gui")]
pub mod window;
