use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MinikeyError>;

#[derive(Debug, Error)]
pub enum MinikeyError {
    /// Structural problem with a secret key blob. Raised before any key derivation.
    #[error("Неверный формат секретного ключа: {0}")]
    Format(String),

    /// Checksum mismatch after unmasking. Covers both a wrong passphrase and
    /// corrupted data; the two cases are not distinguished.
    #[error("Ошибка расшифровки секретного ключа: неверный пароль или ключ повреждён")]
    Crypto,

    #[error("Подпись недействительна")]
    Signature,

    #[error("Ошибка генерации ключа: {0}")]
    KeyGenerationFailed(String),

    #[error("Пароль слишком короткий (минимум {0} символов)")]
    PassphraseTooShort(usize),

    #[error("Пароли не совпадают")]
    PassphraseMismatch,

    #[error("Файл '{}' уже существует. Используйте --force для перезаписи.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Неверная конфигурация: {0}")]
    InvalidConfig(String),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),
}
