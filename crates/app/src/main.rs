use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use services::{Clock, ValidationSessionService};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

mod replay;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFixture,
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFixture => write!(f, "a session fixture is required (--fixture)"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

struct Args {
    db_url: String,
    fixture: PathBuf,
    script: Option<PathBuf>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- replay --fixture <session.json> [--script <events.json>] [--db <sqlite_url>]"
    );
    eprintln!();
    eprintln!("Defaults for replay:");
    eprintln!("  --db sqlite:validation.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VALIDATION_DB_URL, VALIDATION_FIXTURE, VALIDATION_SCRIPT, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Replay,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "replay" => Some(Self::Replay),
            _ => None,
        }
    }
}

impl Args {
    fn parse_replay(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("VALIDATION_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("sqlite:validation.sqlite3".into()), normalize_sqlite_url);
        let mut fixture = std::env::var_os("VALIDATION_FIXTURE").map(PathBuf::from);
        let mut script = std::env::var_os("VALIDATION_SCRIPT").map(PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--fixture" => fixture = Some(require_value(args, "--fixture")?.into()),
                "--script" => script = Some(require_value(args, "--script")?.into()),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            fixture: fixture.ok_or(ArgsError::MissingFixture)?,
            script,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // `replay` is the only command; it may be omitted.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Replay,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Replay,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = match cmd {
        Command::Replay => Args::parse_replay(&mut iter),
    }
    .map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_logging();

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    let clock = Clock::default_clock();
    let fixture = replay::load_fixture(&parsed.fixture)?;
    let (draft, short_flips, long_flips) = fixture.into_parts(clock.now().timestamp_millis());
    let params = draft.validate()?;
    let script = match &parsed.script {
        Some(path) => replay::load_script(path)?,
        None => Vec::new(),
    };

    let service = ValidationSessionService::new(
        clock,
        Arc::clone(&storage.validation_states),
        Arc::new(replay::DryRunSubmitter),
    )
    .with_hooks(replay::logging_hooks());
    let handle = service.start(params, short_flips, long_flips).await?;

    replay::run_script(&handle, script).await?;

    let last = handle.shutdown().await;
    println!("{}", last.state());
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
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
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| (*value).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn memory_and_absolute_urls_are_kept() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/v.sqlite3".into()),
            "sqlite:///tmp/v.sqlite3"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/v.sqlite3".into()),
            "sqlite:///tmp/v.sqlite3"
        );
    }

    #[test]
    fn replay_flags_override_defaults() {
        let parsed = Args::parse_replay(&mut args(&[
            "--db",
            "sqlite::memory:",
            "--fixture",
            "session.json",
            "--script",
            "events.json",
        ]))
        .unwrap();
        assert_eq!(parsed.db_url, "sqlite::memory:");
        assert_eq!(parsed.fixture, PathBuf::from("session.json"));
        assert_eq!(parsed.script, Some(PathBuf::from("events.json")));
    }

    #[test]
    fn replay_flag_without_value_is_rejected() {
        let err = Args::parse_replay(&mut args(&["--fixture"])).err().unwrap();
        assert!(matches!(err, ArgsError::MissingValue { flag: "--fixture" }));

        let err = Args::parse_replay(&mut args(&["--fixture", "a.json", "--bogus"]))
            .err()
            .unwrap();
        assert!(matches!(err, ArgsError::UnknownArg(_)));
    }
}
