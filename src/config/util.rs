//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find the config file by searching upward from the current directory.
///
/// Returns the absolute path to the config file if found.
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    if config_name.is_absolute() && config_name.exists() {
        return Some(config_name.to_path_buf());
    }

    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_returned_as_is() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = tmp.path().join("sassforge.toml");
        std::fs::write(&config, "").unwrap();

        assert_eq!(find_config_file(&config), Some(config));
    }

    #[test]
    fn test_missing_config_is_none() {
        assert_eq!(
            find_config_file(Path::new("/nonexistent/sassforge.toml")),
            None
        );
    }
}
