use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Project configuration from `djgen.config.yaml` in the working directory.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    pub apps: Option<String>,
    pub templates: Option<String>,
}

impl ProjectConfig {
    pub fn apps_root(&self) -> PathBuf {
        PathBuf::from(self.apps.as_deref().unwrap_or("server/apps"))
    }

    pub fn templates_root(&self) -> PathBuf {
        PathBuf::from(self.templates.as_deref().unwrap_or("server/templates"))
    }
}

/// Read the project config if present; defaults apply otherwise.
pub fn read_project_config(dir: &Path) -> ProjectConfig {
    let path = dir.join("djgen.config.yaml");
    if !path.exists() {
        return ProjectConfig::default();
    }

    fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_yaml::from_str(&content).ok())
        .unwrap_or_default()
}
