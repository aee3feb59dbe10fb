//! Настройки minikey
//!
//! Optional JSON file, for example:
//!
//! ```json
//! { "cost": { "profile": "custom", "ops_limit": 1048576, "mem_limit": 33554432 },
//!   "comment": "lab signing key" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::DEFAULT_COMMENT;
use crate::crypto::KdfParams;
use crate::error::{MinikeyError, Result};

const APP_DIR: &str = "minikey";
const SETTINGS_FILE: &str = "settings.json";

/// Минимальная длина пароля по умолчанию
pub const DEFAULT_MIN_PASSPHRASE_LEN: usize = 12;

/// KDF cost used when generating or re-encrypting a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "profile", rename_all = "lowercase")]
pub enum CostProfile {
    #[default]
    Interactive,
    Sensitive,
    Custom { ops_limit: u32, mem_limit: u32 },
}

impl CostProfile {
    pub fn params(&self) -> Result<KdfParams> {
        match *self {
            CostProfile::Interactive => Ok(KdfParams::INTERACTIVE),
            CostProfile::Sensitive => Ok(KdfParams::SENSITIVE),
            CostProfile::Custom {
                ops_limit,
                mem_limit,
            } => KdfParams::new(ops_limit, mem_limit)
                .map_err(|_| MinikeyError::InvalidConfig("ops_limit и mem_limit должны быть больше нуля".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cost: CostProfile,
    /// Text for the untrusted comment line of new secret keys
    pub comment: String,
    pub min_passphrase_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cost: CostProfile::default(),
            comment: DEFAULT_COMMENT.to_string(),
            min_passphrase_len: DEFAULT_MIN_PASSPHRASE_LEN,
        }
    }
}

impl Settings {
    /// Загрузить настройки.
    ///
    /// An explicit path must exist. Without one the per-user config
    /// directory is tried and defaults are used when nothing is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("no settings file, using defaults");
                    Self::default()
                }
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn validate(&self) -> Result<()> {
        self.cost.params()?;
        if self.min_passphrase_len == 0 {
            return Err(MinikeyError::InvalidConfig(
                "min_passphrase_len должен быть больше нуля".into(),
            ));
        }
        Ok(())
    }
}

/// Путь к файлу настроек в каталоге конфигурации пользователя
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}
