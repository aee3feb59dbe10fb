//! Чтение и запись файлов ключей
//!
//! The secret key file holds the armored, passphrase-protected key; the
//! public key is written next to it with a `.pub` suffix.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MinikeyError, Result};

const PUB_SUFFIX: &str = "pub";

/// Путь к публичному ключу рядом с секретным
pub fn public_key_path(secret_path: &Path) -> PathBuf {
    let mut name = secret_path.as_os_str().to_owned();
    name.push(".");
    name.push(PUB_SUFFIX);
    PathBuf::from(name)
}

/// Прочитать файл секретного ключа
pub fn read_secret_key(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "reading secret key");
    Ok(fs::read_to_string(path)?)
}

/// Write the secret key with owner-only permissions.
///
/// Refuses to replace an existing file unless `overwrite` is set.
pub fn write_secret_key(path: &Path, contents: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(MinikeyError::AlreadyExists(path.to_path_buf()));
    }
    ensure_parent(path)?;

    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    debug!(path = %path.display(), "secret key written");
    Ok(())
}

/// Записать публичный ключ (открытый текст)
pub fn write_public_key(path: &Path, contents: &str) -> Result<()> {
    ensure_parent(path)?;
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir)?;
            Ok(())
        }
        _ => Ok(()),
    }
}
