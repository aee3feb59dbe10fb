//! Расшифровка ключа и вывод сведений о нём

use std::path::Path;

use colored::Colorize;

use crate::codec;
use crate::config;
use crate::error::Result;
use crate::signature;

use super::{print_key_summary, prompt_passphrase, step};

pub fn run(path: &Path) -> Result<()> {
    let blob = config::read_secret_key(path)?;
    let comment = codec::comment(&blob)?;

    let passphrase = prompt_passphrase()?;
    let keypair = step("Расшифровка секретного ключа", || {
        codec::deserialize(&blob, passphrase)
    })?;

    println!();
    println!("{} {}", "Комментарий:".cyan(), comment);
    print_key_summary(&keypair);
    println!();
    println!("{}", "Публичный ключ:".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    print!("{}", signature::public_key_text(&keypair));
    println!("{}", "─".repeat(60).dimmed());

    Ok(())
}
