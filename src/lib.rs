// Library surface for headless/integration tests and reuse.
// The binary in main.rs only wires the terminal to `app::App`.
pub mod app;
pub mod app_dirs;
pub mod caret;
pub mod config;
pub mod corpus;
pub mod error;
pub mod history;
pub mod input;
pub mod keymap;
pub mod logging;
pub mod metrics;
pub mod round;
pub mod runtime;
pub mod session;
pub mod time_series;
pub mod ui;
