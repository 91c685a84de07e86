//! Command-line interface definitions and helpers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction};
pub use commands::{handle_config_action, list_presets, run_animate, run_generate, run_studio};
pub use enums::CategoryArg;
