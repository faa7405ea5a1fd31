//! Command-line interface module.

mod args;
pub mod compile;
pub mod watch;

pub use args::{Cli, Commands, CompileArgs, LintArgs};
