//! Смена пароля секретного ключа

use std::path::Path;

use colored::Colorize;

use crate::codec::{self, Layout};
use crate::config::{self, Settings};
use crate::crypto::SigningKeyPair;
use crate::error::Result;

use super::{prompt_new_passphrase, prompt_passphrase, step};

/// `layout` overrides the layout of the file; `None` keeps it.
pub fn run(settings: &Settings, path: &Path, layout: Option<Layout>) -> Result<()> {
    println!("{}", "=== Смена пароля ===".cyan().bold());
    println!();

    let blob = config::read_secret_key(path)?;

    // Получить текущий пароль
    println!("Введите текущий пароль:");
    let old_passphrase = prompt_passphrase()?;

    let keypair = step("Проверка текущего пароля", || {
        codec::deserialize(&blob, old_passphrase)
    })?;

    // Получить новый пароль
    println!();
    let new_passphrase = prompt_new_passphrase(settings.min_passphrase_len)?;
    println!();

    let params = settings.cost.params()?;
    let rekeyed = step("Вычисление нового ключа шифрования", || {
        keypair.rekey(new_passphrase, params)
    })?;
    drop(keypair);

    step("Перешифровка ключа", || {
        let encoded = reencode(&blob, &rekeyed, layout)?;
        config::write_secret_key(path, &encoded, true)
    })?;

    println!();
    println!("{}", "Пароль успешно изменён!".green().bold());

    Ok(())
}

/// Encode `rekeyed` with the comment of the original `blob`, in `layout`
/// or else in the layout `blob` was stored in
fn reencode(blob: &str, rekeyed: &SigningKeyPair, layout: Option<Layout>) -> Result<String> {
    let comment = codec::comment(blob)?;
    let layout = match layout {
        Some(layout) => layout,
        None => codec::layout(blob)?,
    };
    Ok(codec::serialize_with(rekeyed, layout, &comment))
}
