use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::PetKind;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Settings {
    pub(crate) server_url: String,
    pub(crate) pet: PetKind,
    pub(crate) mono: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            pet: PetKind::Hedgehog,
            mono: false,
        }
    }
}

pub(crate) fn settings_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "hutch", "Hutch")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(dir.join("settings.json"))
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v;
        }
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    // Best-effort atomic replace on same filesystem.
    if path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
