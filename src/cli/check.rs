//! Проверка пароля секретного ключа

use std::path::Path;

use colored::Colorize;

use crate::codec;
use crate::config;
use crate::error::Result;

use super::{prompt_passphrase, step};

pub fn run(path: &Path) -> Result<()> {
    let blob = config::read_secret_key(path)?;
    let passphrase = prompt_passphrase()?;

    let keypair = step("Проверка пароля", || codec::deserialize(&blob, passphrase))?;

    println!(
        "{} ключ {}",
        "Пароль верный:".green().bold(),
        keypair.key_id_hex()
    );
    Ok(())
}
