//! Tiny JSON state file. The only durable datum is the forum session
//! cookie captured from a saved request.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::core::error::VetError;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
struct StateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    cookie: Option<String>,
}

pub struct StateFile {
    path: std::path::PathBuf,
}

impl StateFile {
    /// Opens the state file, creating it (and its directory) on first use.
    pub fn new(path: &Path) -> Result<Self, VetError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| VetError::State(e.to_string()))?;
        }
        if !path.exists() {
            fs::write(path, b"{}\n").map_err(|e| VetError::State(e.to_string()))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn cookie(&self) -> Result<Option<String>, VetError> {
        Ok(self.read_data()?.cookie)
    }

    pub fn set_cookie(&self, cookie: &str) -> Result<(), VetError> {
        let mut data = self.read_data()?;
        data.cookie = Some(cookie.to_string());
        self.write_data(&data)
    }

    fn read_data(&self) -> Result<StateData, VetError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| VetError::State(e.to_string()))?;
        // A corrupt file is treated as empty rather than wedging every run.
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    fn write_data(&self, data: &StateData) -> Result<(), VetError> {
        let json = serde_json::to_string_pretty(data).map_err(|_| VetError::Unknown)?;
        fs::write(&self.path, json).map_err(|e| VetError::State(e.to_string()))
    }
}
