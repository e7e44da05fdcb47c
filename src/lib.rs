pub mod cli;
pub mod config;
pub mod youtube;

pub use cli::{run, Cli, CliError};
