//! ui::editor
//!
//! Edit text in the user's editor.
//!
//! # Editor resolution
//!
//! 1. `$EDITOR`, if its program is on `PATH`
//! 2. `$VISUAL`, if its program is on `PATH`
//! 3. Platform editors (`nano`, `vim`, `vi`, ... on Unix; `notepad.exe` on Windows)
//! 4. Common editors (`nano`, `vim`, `vi`)
//!
//! The variables may carry arguments (e.g. `code --wait`); only the first
//! word is checked on `PATH`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::core::io::random_temp_file_path;

/// Errors from editing text.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no text editor found; set $EDITOR")]
    NotFound,

    #[error("failed to prepare temporary file '{path}': {source}")]
    TempFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to launch editor '{editor}': {source}")]
    Launch {
        editor: String,
        source: std::io::Error,
    },

    #[error("editor '{editor}' exited with {status}")]
    Failed { editor: String, status: String },
}

#[cfg(target_os = "windows")]
const PLATFORM_EDITORS: &[&str] = &["notepad.exe", "notepad++"];
#[cfg(target_os = "macos")]
const PLATFORM_EDITORS: &[&str] = &["nano", "vim", "vi"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PLATFORM_EDITORS: &[&str] = &["nano", "vim", "vi", "gedit", "kate"];

const COMMON_EDITORS: &[&str] = &["nano", "vim", "vi"];

/// Pick an editor command.
///
/// `available` reports whether a program exists.
pub fn resolve_editor(
    editor_var: Option<&str>,
    visual_var: Option<&str>,
    available: impl Fn(&str) -> bool,
) -> Option<String> {
    let from_env = [editor_var, visual_var]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|cmd| !cmd.is_empty())
        .find(|cmd| cmd.split_whitespace().next().is_some_and(&available));
    if let Some(cmd) = from_env {
        return Some(cmd.to_string());
    }

    PLATFORM_EDITORS
        .iter()
        .chain(COMMON_EDITORS)
        .copied()
        .find(|&cmd| available(cmd))
        .map(str::to_string)
}

/// Find an editor using the environment and `PATH`.
pub fn find_editor() -> Option<String> {
    let editor = std::env::var("EDITOR").ok();
    let visual = std::env::var("VISUAL").ok();
    resolve_editor(editor.as_deref(), visual.as_deref(), |program| {
        which::which(program).is_ok()
    })
}

/// Open `initial` in the editor and return the saved text.
///
/// The temporary file is removed whether or not editing succeeds.
pub fn open_editor(initial: &str) -> Result<String, EditorError> {
    let editor = find_editor().ok_or(EditorError::NotFound)?;
    edit_with(&editor, initial)
}

/// Like [`open_editor`], with an explicit editor command.
pub fn edit_with(editor: &str, initial: &str) -> Result<String, EditorError> {
    let path = random_temp_file_path("txt");
    fs::write(&path, initial).map_err(|source| EditorError::TempFile {
        path: path.clone(),
        source,
    })?;

    let result = run_editor(editor, &path);
    let _ = fs::remove_file(&path);
    result
}

fn run_editor(editor: &str, path: &Path) -> Result<String, EditorError> {
    let mut words = editor.split_whitespace();
    let program = words.next().ok_or(EditorError::NotFound)?;

    tracing::debug!(editor, path = %path.display(), "launching editor");
    let status = Command::new(program)
        .args(words)
        .arg(path)
        .status()
        .map_err(|source| EditorError::Launch {
            editor: editor.to_string(),
            source,
        })?;
    if !status.success() {
        return Err(EditorError::Failed {
            editor: editor.to_string(),
            status: status.to_string(),
        });
    }

    fs::read_to_string(path).map_err(|source| EditorError::TempFile {
        path: path.to_path_buf(),
        source,
    })
}
