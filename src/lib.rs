pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod format;
pub mod logging;
pub mod system;
pub mod ui;

pub use app::run;
