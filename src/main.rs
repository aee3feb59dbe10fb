use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use minikey::cli::{self, KeyFormat};
use minikey::config::Settings;
use minikey::error::Result;

#[derive(Parser)]
#[command(name = "minikey")]
#[command(author = "Oleg")]
#[command(version = "0.1.0")]
#[command(about = "Ключи подписи Ed25519, защищённые паролем (совместимо с minisign)", long_about = None)]
struct Cli {
    /// Путь к файлу настроек (JSON)
    #[arg(long, global = true, env = "MINIKEY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Создать новую пару ключей
    Generate {
        /// Файл секретного ключа (публичный ключ пишется в <FILE>.pub)
        #[arg(short, long)]
        out: PathBuf,

        /// Текст строки "untrusted comment"
        #[arg(short, long)]
        comment: Option<String>,

        /// Формат секретного ключа
        #[arg(long, value_enum, default_value_t = KeyFormat::Extended)]
        format: KeyFormat,

        /// Перезаписать существующие файлы без вопроса
        #[arg(long)]
        force: bool,
    },

    /// Расшифровать ключ и показать сведения о нём
    Inspect {
        /// Файл секретного ключа
        file: PathBuf,
    },

    /// Проверить пароль секретного ключа
    Check {
        /// Файл секретного ключа
        file: PathBuf,
    },

    /// Сменить пароль секретного ключа
    ChangePass {
        /// Файл секретного ключа
        file: PathBuf,

        /// Формат, в котором ключ будет сохранён (по умолчанию формат исходного файла)
        #[arg(long, value_enum)]
        format: Option<KeyFormat>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minikey=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Ошибка:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            out,
            comment,
            format,
            force,
        } => cli::generate::run(&settings, &out, comment, format.into(), force),
        Commands::Inspect { file } => cli::inspect::run(&file),
        Commands::Check { file } => cli::check::run(&file),
        Commands::ChangePass { file, format } => {
            cli::change_pass::run(&settings, &file, format.map(Into::into))
        }
    }
}
