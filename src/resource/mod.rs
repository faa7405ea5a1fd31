//! Resource resolution: declared source trees to (source, destination) pairs.
//!
//! A [`ResourceSpec`] describes one stylesheet source tree: a base directory,
//! include/exclude globs for the subdirectories to pick up, an optional
//! relative output offset and a destination root. [`map_directories`] turns
//! one spec into an ordered list of directory pairs, [`resolve_all`] does it
//! for a whole configuration, falling back to the simple parameters when no
//! resources are declared.

pub mod scanner;

use crate::utils::path::to_unix_separators;
use crate::{debug, log};
use anyhow::Result;
use scanner::DirScanner;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Include patterns used when a resource declares none.
pub const DEFAULT_INCLUDES: &[&str] = &["**/*.scss"];

/// An ordered (source, destination) directory pair in forward-slash form.
pub type Location = (String, String);

/// One declared stylesheet resource.
///
/// Immutable after configuration loading; when no resources are declared the
/// config layer synthesizes exactly one from the simple parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSpec {
    /// Base directory containing Sass sources.
    pub source_dir: PathBuf,

    /// Directory include globs (`**` any depth, `*` one segment).
    pub includes: Vec<String>,

    /// Directory exclude globs, applied on top of the scanner defaults.
    pub excludes: Vec<String>,

    /// Additional path section appended when calculating the destination of a
    /// matched subdirectory. Allows, for example, sources in
    /// `skins/coal/scss/` to end up in `skins/coal/` by specifying `".."`.
    pub relative_output_dir: Option<String>,

    /// Where the compiled CSS files go.
    pub destination: PathBuf,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            relative_output_dir: None,
            destination: PathBuf::new(),
        }
    }
}

impl ResourceSpec {
    /// Effective include patterns (the default set when none are declared).
    pub fn effective_includes(&self) -> Vec<String> {
        if self.includes.is_empty() {
            DEFAULT_INCLUDES.iter().map(|s| (*s).to_string()).collect()
        } else {
            self.includes.clone()
        }
    }
}

/// Map one resource to its ordered directory pairs.
///
/// The root pair `(source_dir, destination)` always comes first, followed by
/// every matched subdirectory in scanner order. Destinations of subdirectories
/// are `destination/subdir` plus the relative output offset when set. All
/// paths come back in forward-slash form, and source keys are unique within
/// the result.
///
/// A missing source directory yields an empty result (plus an error log),
/// never a failure.
pub fn map_directories(spec: &ResourceSpec) -> Result<Vec<Location>> {
    if !spec.source_dir.is_dir() {
        log!(
            "error";
            "source directory does not exist: {}",
            spec.source_dir.display()
        );
        return Ok(Vec::new());
    }

    let scanner = DirScanner::new(&spec.source_dir, &spec.effective_includes(), &spec.excludes)?;

    let mut seen = HashSet::new();
    let mut result = Vec::new();

    let root_source = to_unix_separators(&spec.source_dir);
    seen.insert(root_source.clone());
    result.push((root_source, to_unix_separators(&spec.destination)));

    for subdir in scanner.scan()? {
        let source = spec.source_dir.join(&subdir);

        let mut dest = spec.destination.join(&subdir);
        if let Some(offset) = &spec.relative_output_dir
            && !offset.is_empty()
        {
            dest = dest.join(offset);
        }

        let source = to_unix_separators(&source);
        if !seen.insert(source.clone()) {
            continue;
        }
        result.push((source, to_unix_separators(&dest)));
    }

    Ok(result)
}

/// Resolve every declared resource into one ordered pair sequence.
///
/// When `specs` is empty, exactly one spec synthesized from the simple
/// parameters (`fallback`) is used instead; declared resources fully
/// supersede the simple configuration. Per-spec internal order and overall
/// declaration order are preserved. Source keys may repeat across specs;
/// the toolchain's last-write-wins applies to duplicates.
pub fn resolve_all(specs: &[ResourceSpec], fallback: &ResourceSpec) -> Result<Vec<Location>> {
    let synthesized;
    let specs: &[ResourceSpec] = if specs.is_empty() {
        log!("compile"; "no resources declared, using simple configuration");
        synthesized = [fallback.clone()];
        &synthesized
    } else {
        specs
    };

    let mut locations = Vec::new();
    for spec in specs {
        for (source, destination) in map_directories(spec)? {
            log!("compile"; "queueing stylesheet directory: {source} => {destination}");
            locations.push((source, destination));
        }
    }

    debug!("compile"; "resolved {} directory pair(s)", locations.len());
    Ok(locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn spec(tmp: &TempDir, includes: &[&str]) -> ResourceSpec {
        ResourceSpec {
            source_dir: tmp.path().join("sass"),
            includes: includes.iter().map(|s| (*s).to_string()).collect(),
            excludes: Vec::new(),
            relative_output_dir: None,
            destination: tmp.path().join("css"),
        }
    }

    fn unix(path: &std::path::Path) -> String {
        to_unix_separators(path)
    }

    #[test]
    fn test_root_pair_always_first() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sass/themes/scss")).unwrap();

        let spec = spec(&tmp, &["**/scss"]);
        let mapping = map_directories(&spec).unwrap();

        assert_eq!(
            mapping[0],
            (unix(&spec.source_dir), unix(&spec.destination))
        );
        assert_eq!(mapping.len(), 2);
        assert_eq!(
            mapping[1],
            (
                unix(&tmp.path().join("sass/themes/scss")),
                unix(&tmp.path().join("css/themes/scss"))
            )
        );
    }

    #[test]
    fn test_missing_source_dir_yields_empty_mapping() {
        let tmp = TempDir::new().unwrap();
        let spec = spec(&tmp, &[]);
        assert!(!spec.source_dir.exists());

        let mapping = map_directories(&spec).unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sass/a/scss")).unwrap();
        fs::create_dir_all(tmp.path().join("sass/b/scss")).unwrap();

        let spec = spec(&tmp, &["**/scss"]);
        let first = map_directories(&spec).unwrap();
        let second = map_directories(&spec).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_relative_output_dir_appended_unnormalized() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sass/a/b")).unwrap();

        let mut spec = spec(&tmp, &["**"]);
        spec.relative_output_dir = Some("..".to_string());
        let mapping = map_directories(&spec).unwrap();

        let nested = mapping
            .iter()
            .find(|(src, _)| src.ends_with("sass/a/b"))
            .unwrap();
        assert_eq!(nested.1, unix(&tmp.path().join("css/a/b/..")));
    }

    #[test]
    fn test_empty_offset_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sass/a")).unwrap();

        let mut spec = spec(&tmp, &["**"]);
        spec.relative_output_dir = Some(String::new());
        let mapping = map_directories(&spec).unwrap();

        let nested = mapping.iter().find(|(src, _)| src.ends_with("sass/a")).unwrap();
        assert_eq!(nested.1, unix(&tmp.path().join("css/a")));
    }

    #[test]
    fn test_fallback_equivalent_to_single_resource() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sass/skins/scss")).unwrap();

        let fallback = spec(&tmp, &["**/scss"]);
        let from_fallback = resolve_all(&[], &fallback).unwrap();
        let from_declared = resolve_all(std::slice::from_ref(&fallback), &fallback).unwrap();
        assert_eq!(from_fallback, from_declared);
    }

    #[test]
    fn test_declared_resources_supersede_fallback() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("declared")).unwrap();

        let declared = ResourceSpec {
            source_dir: tmp.path().join("declared"),
            destination: tmp.path().join("out"),
            ..ResourceSpec::default()
        };
        // Fallback points at a tree that exists; it must still be ignored.
        fs::create_dir_all(tmp.path().join("sass")).unwrap();
        let fallback = spec(&tmp, &[]);

        let locations = resolve_all(std::slice::from_ref(&declared), &fallback).unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].0, unix(&tmp.path().join("declared")));
    }

    #[test]
    fn test_resolve_all_preserves_declaration_order() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("one/scss")).unwrap();
        fs::create_dir_all(tmp.path().join("two/scss")).unwrap();

        let make = |name: &str| ResourceSpec {
            source_dir: tmp.path().join(name),
            includes: vec!["**/scss".to_string()],
            destination: tmp.path().join(format!("{name}-out")),
            ..ResourceSpec::default()
        };
        let fallback = ResourceSpec::default();

        let locations = resolve_all(&[make("two"), make("one")], &fallback).unwrap();
        let sources: Vec<_> = locations.iter().map(|(s, _)| s.as_str()).collect();

        assert_eq!(locations.len(), 4);
        assert!(sources[0].ends_with("/two"));
        assert!(sources[1].ends_with("two/scss"));
        assert!(sources[2].ends_with("/one"));
        assert!(sources[3].ends_with("one/scss"));
    }
}
