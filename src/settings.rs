// Import necessary libraries and modules for file I/O and serialization.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

// Application settings, stored as JSON. The API key never lives here.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub model: String,
    pub api_base: Option<String>, // Alternative OpenAI-compatible endpoint.
    pub debug_mode: bool,         // Debug logging and the debug line in the UI.
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            debug_mode: false,
        }
    }
}

impl Settings {
    // Load settings from the default file path, writing the defaults there on first run.
    pub fn load() -> Result<Self> {
        Self::load_or_create(settings_path()?)
    }

    /// Loads `path`, or saves and returns the defaults when the file does not exist yet.
    /// An existing but unreadable file is an error and is left untouched.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load_settings_from_file(path);
        }
        let settings = Self::default();
        settings.save_to_file(path)?;
        log::info!("Wrote default settings to {}", path.display());
        Ok(settings)
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// Reads the credential from the environment. There is no fallback.
    pub fn api_key_from_env() -> Result<String> {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::MissingApiKey),
        }
    }
}

pub fn data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        AppError::IO(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Failed to get home directory",
        ))
    })?;
    Ok(home_dir.join("narikiri").join("data"))
}

fn settings_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("settings.json"))
}
