use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::{api::ApiSession, timer::DEFAULT_MINUTES};

const ENABLE_LOGS: bool = true;
use crate::log_warn;

pub const API_URL_ENV: &str = "READTRACK_API_URL";
pub const TOKEN_ENV: &str = "READTRACK_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSettings {
    pub api: ApiSession,
    pub default_minutes: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            api: ApiSession::default(),
            default_minutes: DEFAULT_MINUTES,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!("ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Settings file under the platform config directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "readtrack")
            .ok_or_else(|| anyhow!("could not resolve a config directory"))?;
        Ok(dirs.config_dir().join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Result<UserSettings> {
        Ok(self.read()?.clone())
    }

    /// Stored API session with `READTRACK_API_URL` / `READTRACK_TOKEN` applied on top.
    pub fn api_session(&self) -> Result<ApiSession> {
        let stored = self.read()?.api.clone();
        Ok(apply_env(
            stored,
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        ))
    }

    pub fn default_minutes(&self) -> Result<u32> {
        Ok(self.read()?.default_minutes)
    }

    pub fn update(&self, change: impl FnOnce(&mut UserSettings)) -> Result<UserSettings> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        let mut next = guard.clone();
        change(&mut next);
        if next.default_minutes == 0 {
            return Err(anyhow!("default minutes must be at least one"));
        }
        self.persist(&next)?;
        *guard = next.clone();
        Ok(next)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, UserSettings>> {
        self.data
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

fn apply_env(stored: ApiSession, url: Option<String>, token: Option<String>) -> ApiSession {
    let base_url = url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(stored.base_url);
    ApiSession::new(base_url, token.or(stored.token))
}
