//! Project configuration management for `sassforge.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                              |
//! |-------------|------------------------------------------------------|
//! | `[compile]` | Resources, simple params, compiler command and flags |
//! | `[lint]`    | Linter command, findings output, report location     |

pub mod compile;
pub mod error;
pub mod lint;
mod util;

pub use error::{ConfigDiagnostics, ConfigError};

use crate::cli::{Cli, Commands, CompileArgs, LintArgs};
use crate::log;
use crate::utils::path::normalize_path;
use anyhow::{Result, bail};
use compile::CompileConfig;
use lint::LintConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// Root configuration structure representing sassforge.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Compilation settings
    #[serde(default)]
    pub compile: CompileConfig,

    /// Lint settings
    #[serde(default)]
    pub lint: LintConfig,
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root is
    /// the config file's parent directory.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            log!(
                "error";
                "Config file '{}' not found in this directory or any parent.",
                cli.config.display()
            );
            std::process::exit(1);
        };

        let mut config = Self::from_path(&config_path)?;

        config.config_path = config_path;
        config.cli = Some(cli);
        config.finalize(cli);

        config.validate()?;

        Ok(config)
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.root = root.clone();
        self.normalize_paths(&root);
        self.apply_command_options(cli);
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
            if !Self::prompt_continue()? {
                bail!("Aborted due to unknown config fields");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        eprintln!();
        log!("warning"; "unknown fields in {}:", display_path);
        log!("warning"; "ignoring:");
        for field in fields {
            eprintln!("- {field}");
        }
        eprintln!();
    }

    /// Prompt user to continue. Returns true only if user explicitly confirms.
    fn prompt_continue() -> Result<bool> {
        use std::io::{self, Write};

        eprint!("Continue? [y/N] ");
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Compile { args } => {
                self.apply_compile_args(args);
            }
            Commands::Watch { args, poll } => {
                self.apply_compile_args(args);
                Self::update_option(&mut self.compile.poll, poll.as_ref());
            }
            Commands::Lint { args } | Commands::LintReport { args } => {
                self.apply_lint_args(args);
            }
        }
    }

    /// Apply compile arguments from CLI.
    ///
    /// Path arguments are handled earlier, in `normalize_paths`.
    fn apply_compile_args(&mut self, args: &CompileArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.compile.style, args.style.as_ref());
        Self::update_option(&mut self.compile.source_map, args.source_map.as_ref());
        Self::update_option(&mut self.compile.fail_on_error, args.fail_on_error.as_ref());
    }

    /// Apply lint arguments from CLI.
    fn apply_lint_args(&mut self, args: &LintArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.lint.fail_on_error, args.fail_on_error.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to the root directory.
    fn normalize_paths(&mut self, root: &Path) {
        // Apply CLI path overrides first
        if let Some(cli) = self.cli {
            match &cli.command {
                Commands::Compile { args } | Commands::Watch { args, .. } => {
                    Self::update_option(&mut self.compile.source_dir, args.source_dir.as_ref());
                    Self::update_option(&mut self.compile.destination, args.destination.as_ref());
                }
                Commands::Lint { args } | Commands::LintReport { args } => {
                    Self::update_option(&mut self.lint.output, args.output.as_ref());
                    if let Some(lint_config) = &args.lint_config {
                        self.lint.config = Some(lint_config.clone());
                    }
                }
            }
        }

        let root = normalize_path(root);
        self.root = root.clone();
        self.config_path = normalize_path(&self.config_path);

        for resource in &mut self.compile.resources {
            resource.source_dir = normalize_path(&root.join(&resource.source_dir));
            resource.destination = normalize_path(&root.join(&resource.destination));
        }
        self.compile.source_dir = normalize_path(&root.join(&self.compile.source_dir));
        self.compile.destination = normalize_path(&root.join(&self.compile.destination));
        self.compile.load_paths = self
            .compile
            .load_paths
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();

        self.lint.output = normalize_path(&root.join(&self.lint.output));
        self.lint.report = normalize_path(&root.join(&self.lint.report));
        if let Some(lint_config) = self.lint.config.take() {
            self.lint.config = Some(normalize_path(&root.join(lint_config)));
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration for the current command.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        match self.cli.map(|cli| &cli.command) {
            Some(Commands::Compile { .. } | Commands::Watch { .. }) => {
                self.compile.validate(&mut diag);
            }
            Some(Commands::Lint { .. } | Commands::LintReport { .. }) => {
                self.lint.validate(&mut diag);
            }
            None => {
                self.compile.validate(&mut diag);
                self.lint.validate(&mut diag);
            }
        }

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {ignored:?}"
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::OutputStyle;

    #[test]
    fn test_from_str_invalid_toml() {
        let result: Result<ProjectConfig, _> = toml::from_str("[compile\nstyle = \"expanded\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_config_gets_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.compile.source_dir, PathBuf::from("sass"));
        assert_eq!(config.lint.command, vec!["scss-lint".to_string()]);
        assert!(config.cli.is_none());
    }

    #[test]
    fn test_resources_parse() {
        let config = test_parse_config(
            r#"
[compile]
style = "compressed"
source_map = false

[[compile.resources]]
source_dir = "web/sass"
includes = ["**/scss"]
relative_output_dir = ".."
destination = "web"
"#,
        );

        assert_eq!(config.compile.style, OutputStyle::Compressed);
        assert!(!config.compile.source_map);
        assert_eq!(config.compile.resources.len(), 1);

        let resource = &config.compile.resources[0];
        assert_eq!(resource.source_dir, PathBuf::from("web/sass"));
        assert_eq!(resource.includes, vec!["**/scss".to_string()]);
        assert_eq!(resource.relative_output_dir, Some("..".to_string()));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[compile]\nstyle = \"expanded\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.compile.style, OutputStyle::Expanded);
        assert!(!ignored.is_empty());
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_normalize_paths_joins_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = test_parse_config(
            r#"
[compile]
source_dir = "web/sass"
load_paths = ["vendor/bourbon"]

[lint]
output = "target/lint.xml"
"#,
        );

        config.normalize_paths(tmp.path());

        assert!(config.compile.source_dir.is_absolute());
        assert!(config.compile.source_dir.ends_with("web/sass"));
        assert!(config.compile.load_paths[0].ends_with("vendor/bourbon"));
        assert!(config.lint.output.ends_with("target/lint.xml"));
    }
}
