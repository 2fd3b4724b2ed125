pub mod commands;
pub mod handlers;

pub use commands::{BuildToolArg, CliArgs, Commands, RunArgs};
