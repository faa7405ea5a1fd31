//! `[compile]` section.

use crate::compiler::OutputStyle;
use crate::config::error::ConfigDiagnostics;
use crate::resource::{DEFAULT_INCLUDES, ResourceSpec, scanner};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stylesheet compilation settings.
///
/// Either a list of `[[compile.resources]]` tables or the simple
/// `source_dir`/`destination` parameters. Declared resources fully supersede
/// the simple configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Declared stylesheet resources.
    pub resources: Vec<ResourceSpec>,

    /// Simple configuration: base directory containing Sass sources.
    pub source_dir: PathBuf,

    /// Simple configuration: directory include globs.
    pub includes: Vec<String>,

    /// Simple configuration: directory exclude globs.
    pub excludes: Vec<String>,

    /// Simple configuration: relative output offset.
    pub relative_output_dir: Option<String>,

    /// Simple configuration: where the compiled CSS files go.
    pub destination: PathBuf,

    /// Compiler executable with leading arguments (e.g. `["npx", "sass"]`).
    pub command: Vec<String>,

    /// CSS output style.
    pub style: OutputStyle,

    /// Whether to emit source maps.
    pub source_map: bool,

    /// Extra import load paths passed to the compiler.
    pub load_paths: Vec<PathBuf>,

    /// Fail the run when compilation reports errors.
    pub fail_on_error: bool,

    /// Watch mode: use the polling backend instead of native file events.
    pub poll: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
            source_dir: PathBuf::from("sass"),
            includes: DEFAULT_INCLUDES.iter().map(|s| (*s).to_string()).collect(),
            excludes: Vec::new(),
            relative_output_dir: None,
            destination: PathBuf::from("css"),
            command: vec!["sass".to_string()],
            style: OutputStyle::default(),
            source_map: true,
            load_paths: Vec::new(),
            fail_on_error: true,
            poll: false,
        }
    }
}

impl CompileConfig {
    /// Synthesize the fallback resource from the simple parameters.
    pub fn fallback_spec(&self) -> ResourceSpec {
        ResourceSpec {
            source_dir: self.source_dir.clone(),
            includes: self.includes.clone(),
            excludes: self.excludes.clone(),
            relative_output_dir: self.relative_output_dir.clone(),
            destination: self.destination.clone(),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let Some(program) = self.command.first() else {
            diag.error("compile.command", "compiler command is empty");
            return;
        };

        if which::which(program).is_err() {
            diag.error_with_hint(
                "compile.command",
                format!("compiler executable '{program}' not found in PATH"),
                "install dart-sass, or point `command` at a package runner \
                 like [\"npx\", \"sass\"]",
            );
        }

        self.validate_patterns(diag);
    }

    /// Reject malformed glob patterns before any scan runs.
    fn validate_patterns(&self, diag: &mut ConfigDiagnostics) {
        let mut check = |field: &str, patterns: &[String]| {
            if let Err(err) = scanner::build_globset(patterns) {
                diag.error(field, format!("invalid glob pattern: {err}"));
            }
        };

        check("compile.includes", &self.includes);
        check("compile.excludes", &self.excludes);
        for (i, resource) in self.resources.iter().enumerate() {
            check(
                &format!("compile.resources[{i}].includes"),
                &resource.includes,
            );
            check(
                &format!("compile.resources[{i}].excludes"),
                &resource.excludes,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompileConfig::default();
        assert_eq!(config.source_dir, PathBuf::from("sass"));
        assert_eq!(config.destination, PathBuf::from("css"));
        assert_eq!(config.includes, vec!["**/*.scss".to_string()]);
        assert_eq!(config.command, vec!["sass".to_string()]);
        assert!(config.source_map);
        assert!(config.fail_on_error);
        assert!(!config.poll);
    }

    #[test]
    fn test_fallback_spec_mirrors_simple_params() {
        let mut config = CompileConfig::default();
        config.source_dir = PathBuf::from("web/sass");
        config.relative_output_dir = Some("..".to_string());

        let spec = config.fallback_spec();
        assert_eq!(spec.source_dir, config.source_dir);
        assert_eq!(spec.destination, config.destination);
        assert_eq!(spec.relative_output_dir, Some("..".to_string()));
    }

    #[test]
    fn test_empty_command_is_an_error() {
        let mut config = CompileConfig::default();
        config.command = Vec::new();

        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        let mut config = CompileConfig::default();
        config.command = vec!["true".to_string()];
        config.excludes = vec!["a{b".to_string()];

        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert!(
            diag.errors()
                .iter()
                .any(|e| e.field == "compile.excludes")
        );
    }
}
