//! scss-lint execution and exit-code mapping.
//!
//! Runs the external `scss-lint` executable with XML output over every
//! resolved source root and maps its exit code to a build outcome. Every
//! exit code gets its own explicit arm; lint findings of error severity fail
//! the build only when `fail_on_error` is set, while usage/input/internal/
//! configuration errors always do.

pub mod report;

use crate::config::ProjectConfig;
use crate::log;
use crate::utils::exec::Cmd;
use crate::utils::path::to_unix_separators;
use anyhow::{Context, Result, bail};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// scss-lint exit codes and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintExitCode {
    /// 0: no lints were found.
    NoLints,
    /// 1: lints with a severity of 'warning' were reported (no errors).
    Warnings,
    /// 2: one or more errors were reported (and any number of warnings).
    Errors,
    /// 64: command line usage error (invalid flag, etc.).
    UsageError,
    /// 66: input file did not exist or was not readable.
    InputError,
    /// 70: internal software error.
    SoftwareError,
    /// 78: configuration error.
    ConfigError,
}

impl LintExitCode {
    /// Map a raw process exit code.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::NoLints),
            1 => Some(Self::Warnings),
            2 => Some(Self::Errors),
            64 => Some(Self::UsageError),
            66 => Some(Self::InputError),
            70 => Some(Self::SoftwareError),
            78 => Some(Self::ConfigError),
            _ => None,
        }
    }

    pub const fn code(self) -> i32 {
        match self {
            Self::NoLints => 0,
            Self::Warnings => 1,
            Self::Errors => 2,
            Self::UsageError => 64,
            Self::InputError => 66,
            Self::SoftwareError => 70,
            Self::ConfigError => 78,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::NoLints => "No lints were found",
            Self::Warnings => "Lints with a severity of 'warning' were reported (no errors)",
            Self::Errors => "One or more errors were reported (and any number of warnings)",
            Self::UsageError => "Command line usage error (invalid flag, etc.)",
            Self::InputError => "Input file did not exist or was not readable",
            Self::SoftwareError => "Internal software error",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for LintExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Source roots to lint: every declared resource's base directory, or the
/// simple source directory when no resources are declared.
fn lint_roots(config: &ProjectConfig) -> Vec<PathBuf> {
    if config.compile.resources.is_empty() {
        vec![config.compile.source_dir.clone()]
    } else {
        config
            .compile
            .resources
            .iter()
            .map(|r| r.source_dir.clone())
            .collect()
    }
}

/// Run scss-lint once and return its mapped exit code.
///
/// Unknown exit codes and signal terminations are hard failures.
pub fn run(config: &ProjectConfig) -> Result<LintExitCode> {
    let lint = &config.lint;

    if let Some(parent) = lint.output.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create lint output directory `{}`", parent.display())
        })?;
    }

    let roots = lint_roots(config);
    log!(
        "lint";
        "linting Sass sources in: {}",
        roots
            .iter()
            .map(|p| to_unix_separators(p))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut cmd = Cmd::from_slice(&lint.command)
        .arg("--format=XML")
        .arg(format!("-o{}", to_unix_separators(&lint.output)));
    if let Some(lint_config) = &lint.config {
        cmd = cmd.arg("--config").arg(lint_config);
    }
    for root in &roots {
        cmd = cmd.arg(to_unix_separators(root));
    }

    let output = cmd.capture()?;

    let Some(raw) = output.status.code() else {
        bail!("scss-lint terminated by signal: {}", output.status);
    };
    let Some(exit_code) = LintExitCode::from_code(raw) else {
        bail!("scss-lint returned unknown exit code {raw}");
    };

    crate::debug!("lint"; "{exit_code}");
    Ok(exit_code)
}

/// Apply the outcome policy for one lint run.
///
/// `enforce_findings` is false for the report goal, which records findings
/// without failing the build on them.
pub fn apply_outcome(
    exit_code: LintExitCode,
    fail_on_error: bool,
    enforce_findings: bool,
) -> Result<()> {
    match exit_code {
        LintExitCode::NoLints => {
            log!("lint"; "{}", exit_code.message());
            Ok(())
        }
        LintExitCode::Warnings => {
            log!("warning"; "{}", exit_code.message());
            Ok(())
        }
        LintExitCode::Errors => {
            log!("error"; "{exit_code}");
            if fail_on_error && enforce_findings {
                bail!("{exit_code}");
            }
            Ok(())
        }
        LintExitCode::UsageError
        | LintExitCode::InputError
        | LintExitCode::SoftwareError
        | LintExitCode::ConfigError => {
            log!("error"; "{exit_code}");
            bail!("{exit_code}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_roundtrip() {
        for code in [0, 1, 2, 64, 66, 70, 78] {
            let mapped = LintExitCode::from_code(code).unwrap();
            assert_eq!(mapped.code(), code);
        }
    }

    #[test]
    fn test_unknown_exit_code() {
        assert_eq!(LintExitCode::from_code(3), None);
        assert_eq!(LintExitCode::from_code(-1), None);
        assert_eq!(LintExitCode::from_code(65), None);
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let display = LintExitCode::ConfigError.to_string();
        assert_eq!(display, "78: Configuration error");
    }

    #[test]
    fn test_outcome_no_lints_and_warnings_pass() {
        assert!(apply_outcome(LintExitCode::NoLints, true, true).is_ok());
        assert!(apply_outcome(LintExitCode::Warnings, true, true).is_ok());
    }

    #[test]
    fn test_outcome_errors_respect_fail_on_error() {
        assert!(apply_outcome(LintExitCode::Errors, true, true).is_err());
        assert!(apply_outcome(LintExitCode::Errors, false, true).is_ok());
        // report goal records findings without failing
        assert!(apply_outcome(LintExitCode::Errors, true, false).is_ok());
    }

    #[test]
    fn test_outcome_hard_codes_always_fail() {
        for code in [
            LintExitCode::UsageError,
            LintExitCode::InputError,
            LintExitCode::SoftwareError,
            LintExitCode::ConfigError,
        ] {
            assert!(apply_outcome(code, false, false).is_err());
        }
    }
}
