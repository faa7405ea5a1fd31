//! Command-line interface definitions.

use crate::compiler::OutputStyle;
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Sassforge stylesheet build tool CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sassforge.toml)
    #[arg(short = 'C', long, default_value = "sassforge.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile Sass templates into CSS
    #[command(visible_alias = "c")]
    Compile {
        #[command(flatten)]
        args: CompileArgs,
    },

    /// Watch template directories and recompile on change
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        args: CompileArgs,

        /// Poll for file changes instead of using native file events
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        poll: Option<bool>,
    },

    /// Run scss-lint over the Sass sources
    #[command(visible_alias = "l")]
    Lint {
        #[command(flatten)]
        args: LintArgs,
    },

    /// Run scss-lint and render an HTML findings report
    #[command(name = "lint-report")]
    LintReport {
        #[command(flatten)]
        args: LintArgs,
    },
}

/// Shared compile arguments for Compile and Watch commands
#[derive(clap::Args, Debug, Clone)]
pub struct CompileArgs {
    /// Sass source directory (simple configuration, relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub source_dir: Option<PathBuf>,

    /// CSS destination directory (simple configuration, relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub destination: Option<PathBuf>,

    /// CSS output style
    #[arg(long, value_enum)]
    pub style: Option<OutputStyle>,

    /// Emit source maps alongside the compiled CSS
    #[arg(short = 'm', long = "source-map", action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub source_map: Option<bool>,

    /// Fail the run when compilation reports errors
    #[arg(short = 'f', long = "fail-on-error", action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub fail_on_error: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Lint command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct LintArgs {
    /// XML findings output file (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// scss-lint configuration file
    #[arg(long = "lint-config", value_hint = clap::ValueHint::FilePath)]
    pub lint_config: Option<PathBuf>,

    /// Fail the run on findings of error severity
    #[arg(short = 'f', long = "fail-on-error", action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub fail_on_error: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[allow(unused)]
impl Cli {
    pub const fn is_compile(&self) -> bool {
        matches!(self.command, Commands::Compile { .. })
    }
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }
    pub const fn is_lint(&self) -> bool {
        matches!(self.command, Commands::Lint { .. } | Commands::LintReport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_defaults() {
        let cli = Cli::parse_from(["sassforge", "compile"]);
        assert!(cli.is_compile());
        assert_eq!(cli.config, PathBuf::from("sassforge.toml"));

        let Commands::Compile { args } = &cli.command else {
            panic!("expected compile command");
        };
        assert!(args.style.is_none());
        assert!(args.source_map.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_watch_alias_and_poll_flag() {
        let cli = Cli::parse_from(["sassforge", "w", "--poll"]);
        let Commands::Watch { poll, .. } = &cli.command else {
            panic!("expected watch command");
        };
        assert_eq!(*poll, Some(true));
    }

    #[test]
    fn test_source_map_tri_state() {
        let cli = Cli::parse_from(["sassforge", "compile", "--source-map", "false"]);
        let Commands::Compile { args } = &cli.command else {
            panic!("expected compile command");
        };
        assert_eq!(args.source_map, Some(false));
    }

    #[test]
    fn test_lint_report_name() {
        let cli = Cli::parse_from(["sassforge", "lint-report", "-o", "out/lint.xml"]);
        let Commands::LintReport { args } = &cli.command else {
            panic!("expected lint-report command");
        };
        assert_eq!(args.output, Some(PathBuf::from("out/lint.xml")));
    }
}
