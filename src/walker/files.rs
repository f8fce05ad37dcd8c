use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as Json;

use super::{WalkError, WalkResult};

pub fn read_json(path: &Path) -> WalkResult<Json> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(WalkError::MissingInput(path.to_path_buf()));
        }
        Err(e) => return Err(WalkError::Io(path.to_path_buf(), e)),
    };
    serde_json::from_str(&contents).map_err(|e| WalkError::Json(path.to_path_buf(), e))
}

/// Writes pretty-printed JSON, creating parent directories as needed.
pub fn write_json(path: &Path, value: &Json) -> WalkResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| WalkError::Io(parent.to_path_buf(), e))?;
        }
    }
    let mut text =
        serde_json::to_string_pretty(value).map_err(|e| WalkError::Json(path.to_path_buf(), e))?;
    text.push('\n');
    fs::write(path, text).map_err(|e| WalkError::Io(path.to_path_buf(), e))
}

/// `*.json` files directly inside `dir`, sorted by name.
pub fn json_files_in(dir: &Path) -> WalkResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| WalkError::Io(dir.to_path_buf(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| WalkError::Io(dir.to_path_buf(), e))?;
        let path = entry.path();
        let is_json = path.extension().map(|ext| ext == "json").unwrap_or(false);
        if is_json && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// True if `dir` exists and holds at least one entry.
pub(crate) fn dir_has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Collection name a file stands for: its name without `.json`.
pub(crate) fn collection_name(path: &Path) -> WalkResult<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(String::from)
        .ok_or_else(|| WalkError::Malformed(path.to_path_buf(), "unusable file name".to_string()))
}
