mod config;
mod play;
mod telemetry;

use std::error::Error;
use std::path::Path;

use config::{Args, ArgsError, Command, print_usage};
use services::{AppServices, Clock};
use storage::repository::{HistoryLog, Storage, StorageBackend};
use storage::source;

async fn run() -> Result<(), Box<dyn Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means play.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            ArgsError::UnknownArg(first.to_string())
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    telemetry::init_tracing();

    match cmd {
        Command::Play => {
            let backend = parsed.backend();
            prepare_backend(&backend)?;
            let services = AppServices::open(
                &parsed.questions_path(),
                &backend,
                Clock::system(),
                parsed.settings(),
            )
            .await?;
            play::run_play(&services).await
        }
        Command::History => {
            let backend = parsed.backend();
            prepare_backend(&backend)?;
            let storage = Storage::open(&backend).await?;
            let entries = storage.history.list_history(parsed.limit).await?;
            if entries.is_empty() {
                println!("No attempts recorded yet.");
            }
            for entry in entries {
                println!(
                    "{}  score {:>4}  correct fields {}",
                    entry.timestamp_iso(),
                    entry.score(),
                    entry.correct_fields().value()
                );
            }
            Ok(())
        }
        Command::Seed => {
            let path = parsed.questions_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let written = source::write_sample_source(&path, parsed.force)?;
            println!("Wrote {written} reactions to {}", path.display());
            Ok(())
        }
    }
}

fn prepare_backend(backend: &StorageBackend) -> Result<(), Box<dyn Error>> {
    match backend {
        StorageBackend::Sqlite { url } => prepare_sqlite_file(url),
        StorageBackend::Files { .. } | StorageBackend::Memory => Ok(()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Err(format!("unsupported sqlite url: {db_url}").into());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(format!("unsupported sqlite url: {db_url}").into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
