//! `[lint]` section.

use crate::config::error::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// scss-lint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Linter executable with leading arguments.
    pub command: Vec<String>,

    /// Where the XML findings file is written.
    pub output: PathBuf,

    /// Where the HTML findings report is written.
    pub report: PathBuf,

    /// Optional `.scss-lint.yml` passed to the linter.
    pub config: Option<PathBuf>,

    /// Fail the run on findings of error severity.
    pub fail_on_error: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            command: vec!["scss-lint".to_string()],
            output: PathBuf::from("reports/scss-lint.xml"),
            report: PathBuf::from("reports/scss-lint.html"),
            config: None,
            fail_on_error: true,
        }
    }
}

impl LintConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let Some(program) = self.command.first() else {
            diag.error("lint.command", "linter command is empty");
            return;
        };

        if which::which(program).is_err() {
            diag.error_with_hint(
                "lint.command",
                format!("linter executable '{program}' not found in PATH"),
                "gem install scss_lint, or point `command` at a wrapper \
                 like [\"bundle\", \"exec\", \"scss-lint\"]",
            );
        }

        if let Some(lint_config) = &self.config
            && !lint_config.is_file()
        {
            diag.error(
                "lint.config",
                format!("lint config file not found: {}", lint_config.display()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LintConfig::default();
        assert_eq!(config.command, vec!["scss-lint".to_string()]);
        assert_eq!(config.output, PathBuf::from("reports/scss-lint.xml"));
        assert_eq!(config.report, PathBuf::from("reports/scss-lint.html"));
        assert!(config.config.is_none());
        assert!(config.fail_on_error);
    }

    #[test]
    fn test_empty_command_is_an_error() {
        let mut config = LintConfig::default();
        config.command = Vec::new();

        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_missing_lint_config_file_is_an_error() {
        let mut config = LintConfig::default();
        config.command = vec!["true".to_string()];
        config.config = Some(PathBuf::from("/nonexistent/.scss-lint.yml"));

        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert!(diag.errors().iter().any(|e| e.field == "lint.config"));
    }
}
