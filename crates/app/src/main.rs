mod terminal;

use std::fmt;
use std::path::{Path, PathBuf};

use quiz_core::model::{QuizSettings, SessionSummary};
use services::{AppServices, Clock, DEFAULT_EXPORT_FILE, QuizEvent, Round};

use crate::terminal::Input;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidMode { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    InvalidEnv { key: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidEnv { key, raw } => write!(f, "invalid {key} value: {raw}"),
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

fn parse_number(value: String, flag: &'static str) -> Result<u32, ArgsError> {
    value
        .trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw: value })
}

fn env_number(key: &'static str, raw: String) -> Result<u32, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidEnv { key, raw })
}

/// Quiz settings from `QUICKMATH_*` variables, looked up through `var`.
fn env_settings(var: impl Fn(&str) -> Option<String>) -> Result<QuizSettings, ArgsError> {
    let mut settings = QuizSettings::default();
    if let Some(raw) = var("QUICKMATH_MODE") {
        settings.mode = raw.parse().map_err(|_| ArgsError::InvalidEnv {
            key: "QUICKMATH_MODE",
            raw,
        })?;
    }
    if let Some(raw) = var("QUICKMATH_ROUNDS") {
        settings.round_cap = env_number("QUICKMATH_ROUNDS", raw)?;
    }
    if let Some(raw) = var("QUICKMATH_TIME") {
        settings.total_time_secs = env_number("QUICKMATH_TIME", raw)?;
    }
    if let Some(raw) = var("QUICKMATH_LIVES") {
        settings.initial_lives = env_number("QUICKMATH_LIVES", raw)?;
    }
    log::debug!("settings after environment: {settings:?}");
    Ok(settings)
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [play] [--mode <mode>] [--rounds <n>] [--time <secs>]");
    eprintln!("                             [--lives <n>] [--db <sqlite_url>] [--export <path>]");
    eprintln!("  cargo run -p app -- high       [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- reset-high [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults for play:");
    eprintln!("  --mode mixed (add, sub, mul, div, mixed)");
    eprintln!("  --rounds 10 --time 60 --lives 3");
    eprintln!("  --db sqlite:quickmath.sqlite3");
    eprintln!("  --export writes {DEFAULT_EXPORT_FILE} when given a directory");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUICKMATH_MODE, QUICKMATH_ROUNDS, QUICKMATH_TIME, QUICKMATH_LIVES,");
    eprintln!("  QUICKMATH_DB_URL");
    eprintln!("  RUST_LOG (e.g. RUST_LOG=debug)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    High,
    ResetHigh,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "high" => Some(Self::High),
            "reset-high" => Some(Self::ResetHigh),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    settings: QuizSettings,
    export: Option<PathBuf>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>, cmd: Command) -> Result<Self, ArgsError> {
        Self::parse_with_env(args, cmd, |key| std::env::var(key).ok())
    }

    fn parse_with_env(
        args: &mut impl Iterator<Item = String>,
        cmd: Command,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            var("QUICKMATH_DB_URL").unwrap_or_else(|| "sqlite:quickmath.sqlite3".into()),
        );
        // Only `play` reads quiz settings, so a bad variable must not block `high`.
        let mut settings = if cmd == Command::Play {
            env_settings(&var)?
        } else {
            QuizSettings::default()
        };
        let mut export = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--mode" if cmd == Command::Play => {
                    let value = require_value(args, "--mode")?;
                    settings.mode = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidMode { raw: value.clone() })?;
                }
                "--rounds" if cmd == Command::Play => {
                    let value = require_value(args, "--rounds")?;
                    settings.round_cap = parse_number(value, "--rounds")?;
                }
                "--time" if cmd == Command::Play => {
                    let value = require_value(args, "--time")?;
                    settings.total_time_secs = parse_number(value, "--time")?;
                }
                "--lives" if cmd == Command::Play => {
                    let value = require_value(args, "--lives")?;
                    settings.initial_lives = parse_number(value, "--lives")?;
                }
                "--export" if cmd == Command::Play => {
                    export = Some(PathBuf::from(require_value(args, "--export")?));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            settings,
            export,
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

fn export_target(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_EXPORT_FILE)
    } else {
        path.to_path_buf()
    }
}

fn export_result(
    services: &AppServices,
    summary: &SessionSummary,
    settings: &QuizSettings,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let export = services.export();
    let record = export.build(summary, settings);
    let target = export_target(path);
    export.write_to(&target, &record)?;
    println!("result written to {}", target.display());
    Ok(())
}

async fn play(services: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    args.settings.validate()?;

    let mut quiz = services.spawn_quiz(args.settings.clone()).await?;
    let mut input = terminal::spawn_stdin_reader();
    terminal::print_intro(&args.settings);
    quiz.handle.start()?;

    let mut current: Option<Round> = None;
    let mut finished = false;

    loop {
        tokio::select! {
            event = quiz.events.recv() => {
                let Some(event) = event else { break };
                terminal::render(&event);
                match event {
                    QuizEvent::Question { round, .. } => {
                        current = Some(round);
                        finished = false;
                    }
                    QuizEvent::Answered { .. } => current = None,
                    QuizEvent::Ended { summary, .. } => {
                        current = None;
                        finished = true;
                        if let Some(path) = &args.export {
                            export_result(services, &summary, &args.settings, path)?;
                        }
                    }
                    QuizEvent::StartRejected(err) => {
                        log::warn!("quiz refused to start: {err}");
                        break;
                    }
                    QuizEvent::Tick { .. } => {}
                }
            }
            line = input.recv() => {
                let Some(line) = line else {
                    log::debug!("stdin closed, leaving the quiz");
                    break;
                };
                match terminal::parse_input(&line, current.as_ref()) {
                    Input::Quit if finished => break,
                    Input::Quit => quiz.handle.stop()?,
                    Input::Again if finished => quiz.handle.start()?,
                    Input::Answer(value) if !finished => quiz.handle.submit(value)?,
                    Input::Answer(_) | Input::Again | Input::Unknown => {
                        terminal::print_hint(!finished);
                    }
                }
            }
        }
    }

    if quiz.handle.shutdown().is_ok() {
        quiz.task.await?;
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            print_usage();
            ArgsError::UnknownCommand(first.to_string())
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, cmd).inspect_err(|_| print_usage())?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;

    match cmd {
        Command::Play => play(&services, &parsed).await,
        Command::High => {
            let high = services.high_scores().load().await?;
            println!("high score: {high}");
            Ok(())
        }
        Command::ResetHigh => {
            services.high_scores().reset().await?;
            println!("high score reset");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
