//! Генерация новой пары ключей

use std::path::Path;

use colored::Colorize;

use crate::codec::{self, Layout};
use crate::config::{self, Settings};
use crate::crypto::SigningKeyPair;
use crate::error::Result;
use crate::signature;

use super::{confirm, print_key_summary, prompt_new_passphrase, step};

pub fn run(
    settings: &Settings,
    out: &Path,
    comment: Option<String>,
    layout: Layout,
    force: bool,
) -> Result<()> {
    println!("{}", "=== Генерация ключа подписи ===".cyan().bold());
    println!();

    let pub_path = config::public_key_path(out);

    if !force && (out.exists() || pub_path.exists()) {
        println!(
            "{} файл {} уже существует.",
            "Внимание:".yellow().bold(),
            out.display()
        );
        println!("Старый ключ будет безвозвратно потерян.\n");

        if !confirm("Перезаписать?") {
            println!("Отменено.");
            return Ok(());
        }
        println!();
    }

    let params = settings.cost.params()?;
    let passphrase = prompt_new_passphrase(settings.min_passphrase_len)?;
    println!();

    let keypair = step("Вычисление ключа шифрования и генерация Ed25519", || {
        SigningKeyPair::generate_with(passphrase, params)
    })?;

    let comment = comment.unwrap_or_else(|| settings.comment.clone());
    let secret_text = codec::serialize_with(&keypair, layout, &comment);
    let public_text = signature::public_key_text(&keypair);

    step("Сохранение ключей", || {
        config::write_secret_key(out, &secret_text, true)?;
        config::write_public_key(&pub_path, &public_text)
    })?;

    println!();
    println!("{}", "=== Ключ создан ===".green().bold());
    println!();
    print_key_summary(&keypair);
    println!();
    println!("{} {}", "Секретный ключ:".cyan(), out.display());
    println!("{} {}", "Публичный ключ:".cyan(), pub_path.display());
    println!();
    println!("{}", "─".repeat(60).dimmed());
    print!("{}", public_text);
    println!("{}", "─".repeat(60).dimmed());

    Ok(())
}
