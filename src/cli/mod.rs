//! Реализация CLI команд

pub mod change_pass;
pub mod check;
pub mod generate;
pub mod inspect;

use std::io::{self, Write};

use clap::ValueEnum;
use colored::Colorize;
use zeroize::Zeroize;

use crate::codec::Layout;
use crate::crypto::{KdfParams, Passphrase, SigningKeyPair};
use crate::error::{MinikeyError, Result};

/// Формат файла секретного ключа
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyFormat {
    /// 190 байт, публичный ключ в отдельном поле
    Extended,
    /// 158 байт, совместимо с minisign
    Minisign,
}

impl From<KeyFormat> for Layout {
    fn from(format: KeyFormat) -> Self {
        match format {
            KeyFormat::Extended => Layout::Extended,
            KeyFormat::Minisign => Layout::Minisign,
        }
    }
}

/// Запросить новый пароль с подтверждением
pub fn prompt_new_passphrase(min_len: usize) -> Result<Passphrase> {
    println!("{}", "Создание пароля".cyan().bold());
    println!("Этот пароль шифрует ваш секретный ключ. Выберите надёжный пароль.");
    println!("Минимальная длина: {} символов\n", min_len);

    loop {
        let mut passphrase = rpassword::prompt_password("Введите пароль: ")?;

        if let Err(e) = check_length(&passphrase, min_len) {
            passphrase.zeroize();
            println!("{} {}", "Ошибка:".red(), e);
            continue;
        }

        let mut confirm = rpassword::prompt_password("Подтвердите пароль: ")?;
        let matches = passphrase == confirm;
        confirm.zeroize();

        if !matches {
            passphrase.zeroize();
            println!("{} {}", "Ошибка:".red(), MinikeyError::PassphraseMismatch);
            continue;
        }

        return Ok(Passphrase::from(passphrase));
    }
}

/// Запросить существующий пароль
pub fn prompt_passphrase() -> Result<Passphrase> {
    let passphrase = rpassword::prompt_password("Введите пароль: ")?;
    Ok(Passphrase::from(passphrase))
}

/// Запросить подтверждение да/нет
pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да")
}

fn check_length(passphrase: &str, min_len: usize) -> Result<()> {
    if passphrase.chars().count() < min_len {
        return Err(MinikeyError::PassphraseTooShort(min_len));
    }
    Ok(())
}

/// Print a step label, run `f`, then print the outcome
fn step<T>(label: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    print!("{}", format!("{}... ", label).cyan());
    io::stdout().flush()?;

    match f() {
        Ok(value) => {
            println!("{}", "готово".green());
            Ok(value)
        }
        Err(e) => {
            println!("{}", "ошибка".red());
            Err(e)
        }
    }
}

/// Сведения о ключе
fn print_key_summary(keypair: &SigningKeyPair) {
    let kdf: KdfParams = keypair.kdf_params();
    let cost = kdf.scrypt_cost();

    println!("{} {}", "ID ключа:".cyan(), keypair.key_id_hex().bold());
    println!(
        "{} {}",
        "Алгоритм:".cyan(),
        String::from_utf8_lossy(keypair.algorithm_tag())
    );
    println!(
        "{} opslimit={} memlimit={} (N=2^{}, r={}, p={})",
        "KDF:".cyan(),
        kdf.ops_limit,
        kdf.mem_limit,
        cost.log_n,
        cost.r,
        cost.p
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_length_counts_characters() {
        assert!(check_length("короткий", 12).is_err());
        assert!(check_length("достаточно длинный", 12).is_ok());
        assert!(matches!(
            check_length("abc", 4),
            Err(MinikeyError::PassphraseTooShort(4))
        ));
    }

    #[test]
    fn test_key_format_maps_to_layout() {
        assert_eq!(Layout::from(KeyFormat::Extended), Layout::Extended);
        assert_eq!(Layout::from(KeyFormat::Minisign), Layout::Minisign);
    }
}
