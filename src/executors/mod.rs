pub mod command;
pub mod toolchain;

pub use command::{CommandOutput, CommandSpec, ProcessRunner, SystemRunner};
