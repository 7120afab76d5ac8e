//! core::io
//!
//! Filesystem helpers.

use std::path::PathBuf;

/// A random, not yet existing path in the temporary directory.
///
/// Leading dots of `suffix` are ignored; an empty suffix yields a path with
/// no extension.
///
/// # Example
///
/// ```
/// use vrachos::core::io::random_temp_file_path;
///
/// let path = random_temp_file_path(".json");
/// assert_eq!(path.extension().unwrap(), "json");
/// assert!(path.starts_with(std::env::temp_dir()));
/// ```
pub fn random_temp_file_path(suffix: &str) -> PathBuf {
    let suffix = suffix.trim_start_matches('.');
    let stem = uuid::Uuid::new_v4().to_string();
    let name = if suffix.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, suffix)
    };
    std::env::temp_dir().join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_normalized() {
        assert_eq!(random_temp_file_path("log").extension().unwrap(), "log");
        assert_eq!(random_temp_file_path("..txt").extension().unwrap(), "txt");
        assert!(random_temp_file_path("").extension().is_none());
    }

    #[test]
    fn paths_are_unique() {
        assert_ne!(random_temp_file_path("txt"), random_temp_file_path("txt"));
    }
}
