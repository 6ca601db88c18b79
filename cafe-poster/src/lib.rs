pub mod cafe;
pub mod cli;
pub mod handler;
pub mod load_config;
pub mod pflow;

pub use cli::{run, Cli, Commands, PublishArgs};
