use std::fmt;
use std::path::{Path, PathBuf};

use reaction_core::model::{DEFAULT_ROUND_SECONDS, SessionSettings};
use storage::repository::StorageBackend;

pub const DEFAULT_QUESTIONS: &str = "reactions.csv";
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const SQLITE_FILE: &str = "quiz.sqlite3";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidStore { raw: String },
    InvalidRoundSeconds { raw: String },
    InvalidLimit { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidStore { raw } => {
                write!(f, "invalid --store value: {raw} (expected files, sqlite or memory)")
            }
            ArgsError::InvalidRoundSeconds { raw } => {
                write!(f, "invalid --round-seconds value: {raw}")
            }
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- play    [--questions <csv>] [--data-dir <dir>] [--store <kind>] [--round-seconds <n>]"
    );
    eprintln!("  cargo run -p app -- history [--data-dir <dir>] [--store <kind>] [--limit <n>]");
    eprintln!("  cargo run -p app -- seed    [--questions <csv>] [--data-dir <dir>] [--force]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --questions {DEFAULT_QUESTIONS} (relative to --data-dir)");
    eprintln!("  --data-dir .");
    eprintln!("  --store files   (files | sqlite | memory)");
    eprintln!("  --round-seconds {DEFAULT_ROUND_SECONDS}");
    eprintln!("  --limit {DEFAULT_HISTORY_LIMIT}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_QUESTIONS, QUIZ_DATA_DIR, QUIZ_STORE, QUIZ_ROUND_SECONDS");
    eprintln!("  QUIZ_LOG (tracing filter, default info), QUIZ_LOG_FORMAT (json)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    History,
    Seed,
}

impl Command {
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "history" => Some(Self::History),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Files,
    Sqlite,
    Memory,
}

impl StoreKind {
    fn parse(raw: &str) -> Result<Self, ArgsError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "files" => Ok(Self::Files),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(ArgsError::InvalidStore {
                raw: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub questions: PathBuf,
    pub data_dir: PathBuf,
    pub store: StoreKind,
    pub round_seconds: u32,
    pub limit: usize,
    pub force: bool,
}

impl Args {
    /// Parse the flags that follow a subcommand, falling back to `env` for
    /// anything not given on the command line.
    ///
    /// `env` is usually `|key| std::env::var(key).ok()`.
    pub fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut questions = env("QUIZ_QUESTIONS")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_QUESTIONS), PathBuf::from);
        let mut data_dir = env("QUIZ_DATA_DIR")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let mut store = match env("QUIZ_STORE") {
            Some(value) => StoreKind::parse(&value)?,
            None => StoreKind::Files,
        };
        let mut round_seconds = match env("QUIZ_ROUND_SECONDS") {
            Some(value) => parse_round_seconds(value)?,
            None => DEFAULT_ROUND_SECONDS,
        };
        let mut limit = DEFAULT_HISTORY_LIMIT;
        let mut force = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--questions" => questions = PathBuf::from(require_value(args, "--questions")?),
                "--data-dir" => data_dir = PathBuf::from(require_value(args, "--data-dir")?),
                "--store" => store = StoreKind::parse(&require_value(args, "--store")?)?,
                "--round-seconds" => {
                    round_seconds = parse_round_seconds(require_value(args, "--round-seconds")?)?;
                }
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    limit = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--force" => force = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            questions,
            data_dir,
            store,
            round_seconds,
            limit,
            force,
        })
    }

    /// The question source, resolved against the data directory when relative.
    pub fn questions_path(&self) -> PathBuf {
        if self.questions.is_absolute() {
            self.questions.clone()
        } else {
            self.data_dir.join(&self.questions)
        }
    }

    pub fn settings(&self) -> SessionSettings {
        // Zero is rejected while parsing.
        SessionSettings::new(self.round_seconds).unwrap_or_default()
    }

    pub fn backend(&self) -> StorageBackend {
        match self.store {
            StoreKind::Files => StorageBackend::Files {
                dir: self.data_dir.clone(),
            },
            StoreKind::Sqlite => StorageBackend::Sqlite {
                url: sqlite_url(&self.data_dir.join(SQLITE_FILE)),
            },
            StoreKind::Memory => StorageBackend::Memory,
        }
    }
}

fn parse_round_seconds(value: String) -> Result<u32, ArgsError> {
    match value.trim().parse::<u32>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(ArgsError::InvalidRoundSeconds { raw: value }),
    }
}

fn sqlite_url(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
