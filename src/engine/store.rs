use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::settings_io::app_dir;
use crate::error::Result;
use crate::model::progress_state::ProgressState;

pub const SAVE_FILE_NAME: &str = "sistema_data.json";

/// Default save location: `<data dir>/monarch_system/sistema_data.json`.
pub fn default_save_path() -> PathBuf {
    app_dir(dirs::data_dir()).join(SAVE_FILE_NAME)
}

/// Single JSON document on disk, overwritten wholesale on every save.
/// No locking: two sessions on the same file race and the last writer wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no save exists yet.
    pub fn load(&self) -> Result<Option<ProgressState>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no save file yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let state = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), bytes = raw.len(), "loaded save file");
        Ok(Some(state))
    }

    /// Write the full document to a sibling temp file, then rename it over
    /// the save. A failure at any step leaves the previous save untouched.
    pub fn save(&self, state: &ProgressState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json.as_bytes())?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), level = state.level, xp = state.experience, "saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| SAVE_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
