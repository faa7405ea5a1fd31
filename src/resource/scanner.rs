//! Directory scanning with glob include/exclude matching.
//!
//! Walks a source tree and reports the relative paths of directories that
//! match the include patterns and none of the exclude patterns. `**` matches
//! any depth, `*` a single path segment. A conventional default-exclude set
//! (version control directories, OS metadata, editor backups) is always
//! appended to the user's excludes.

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use jwalk::WalkDir;
use std::path::{Path, PathBuf};

/// Default excludes, the set conventionally bundled with directory scanners.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // version control
    "**/.git",
    "**/.git/**",
    "**/.svn",
    "**/.svn/**",
    "**/.hg",
    "**/.hg/**",
    "**/.bzr",
    "**/.bzr/**",
    "**/CVS",
    "**/CVS/**",
    // OS metadata
    "**/.DS_Store",
    "**/Thumbs.db",
    // editor backups
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/*.swp",
];

/// Directory scanner for one source tree.
pub struct DirScanner {
    base: PathBuf,
    includes: GlobSet,
    excludes: GlobSet,
}

impl DirScanner {
    /// Build a scanner for `base` with the given patterns.
    ///
    /// Glob syntax errors are fatal.
    pub fn new(base: &Path, includes: &[String], excludes: &[String]) -> Result<Self> {
        let mut all_excludes: Vec<String> = excludes.to_vec();
        all_excludes.extend(DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()));

        Ok(Self {
            base: base.to_path_buf(),
            includes: build_globset(includes)?,
            excludes: build_globset(&all_excludes)?,
        })
    }

    /// Relative paths of matched directories, in sorted order.
    ///
    /// The base directory itself is never reported. Walk errors (permission
    /// failures, vanished entries) propagate.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut matched = Vec::new();

        for entry in WalkDir::new(&self.base).sort(true).skip_hidden(false) {
            let entry = entry
                .with_context(|| format!("failed to scan `{}`", self.base.display()))?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let Ok(relative) = path.strip_prefix(&self.base) else {
                continue;
            };
            if relative.as_os_str().is_empty() {
                continue;
            }

            if self.excludes.is_match(relative) {
                continue;
            }
            if self.includes.is_match(relative) {
                matched.push(relative.to_path_buf());
            }
        }

        Ok(matched)
    }
}

/// Build an efficient glob set from pattern strings.
///
/// `literal_separator` keeps `*` within one path segment; `**` spans depth.
pub fn build_globset<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let pat = pat.as_ref();
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern `{pat}`"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(dirs: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for dir in dirs {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        tmp
    }

    #[test]
    fn test_scan_matches_directories_sorted() {
        let tmp = tree(&["b/scss", "a/scss", "a/css"]);
        let scanner =
            DirScanner::new(tmp.path(), &["**/scss".to_string()], &[]).unwrap();
        let matched = scanner.scan().unwrap();
        assert_eq!(
            matched,
            vec![PathBuf::from("a/scss"), PathBuf::from("b/scss")]
        );
    }

    #[test]
    fn test_scan_excludes_win_over_includes() {
        let tmp = tree(&["skins/scss", "vendor/scss"]);
        let scanner = DirScanner::new(
            tmp.path(),
            &["**/scss".to_string()],
            &["vendor/**".to_string()],
        )
        .unwrap();
        let matched = scanner.scan().unwrap();
        assert_eq!(matched, vec![PathBuf::from("skins/scss")]);
    }

    #[test]
    fn test_scan_default_excludes() {
        let tmp = tree(&[".git/scss", ".svn/scss", "CVS/scss", "real/scss"]);
        let scanner =
            DirScanner::new(tmp.path(), &["**/scss".to_string()], &[]).unwrap();
        let matched = scanner.scan().unwrap();
        assert_eq!(matched, vec![PathBuf::from("real/scss")]);
    }

    #[test]
    fn test_scan_never_reports_base() {
        let tmp = tree(&["sub"]);
        let scanner =
            DirScanner::new(tmp.path(), &["**".to_string()], &[]).unwrap();
        let matched = scanner.scan().unwrap();
        assert_eq!(matched, vec![PathBuf::from("sub")]);
    }

    #[test]
    fn test_single_star_is_one_segment() {
        let tmp = tree(&["a/scss", "scss"]);
        let scanner =
            DirScanner::new(tmp.path(), &["*/scss".to_string()], &[]).unwrap();
        let matched = scanner.scan().unwrap();
        assert_eq!(matched, vec![PathBuf::from("a/scss")]);
    }

    #[test]
    fn test_invalid_glob_is_fatal() {
        let tmp = tree(&[]);
        let result = DirScanner::new(tmp.path(), &["{broken".to_string()], &[]);
        assert!(result.is_err());
    }
}
