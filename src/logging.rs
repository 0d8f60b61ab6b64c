use std::{env, fmt::Display};

use colored::Colorize;
use log::{Level, LevelFilter};

/// Other crates are only heard from when something goes wrong
const EXTERNAL_LEVEL: LevelFilter = LevelFilter::Warn;

/// Reads `BABYREVEAL_LOG` (error, warn, info, debug, trace), defaulting to info
pub fn level_from_env() -> LevelFilter {
    env::var("BABYREVEAL_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^8} {}",
                badge(record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                Source::of(record.target()),
                message
            ))
        })
        .filter(move |meta| match Source::of(meta.target()) {
            Source::External(_) => meta.level() <= EXTERNAL_LEVEL,
            _ => meta.level() <= level,
        })
        .chain(std::io::stdout())
        .apply()
}

/// Which part of the workspace a log line came from
enum Source<'a> {
    App,
    Core,
    Server,
    External(&'a str),
}

impl<'a> Source<'a> {
    fn of(target: &'a str) -> Self {
        let krate = target.split("::").next().unwrap_or(target);

        match krate {
            "babyreveal" => Self::App,
            "babyreveal_core" => Self::Core,
            "babyreveal_server" => Self::Server,
            other => Self::External(other),
        }
    }
}

impl Display for Source<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::App => "APP".bright_purple(),
            Self::Core => "CORE".blue(),
            Self::Server => "SERVER".bright_green(),
            Self::External(name) => name.clear(),
        };

        Display::fmt(&label, f)
    }
}

fn badge(level: Level) -> String {
    match level {
        Level::Error => " ERR ".black().on_red().bold().to_string(),
        Level::Warn => " WRN ".black().on_yellow().bold().to_string(),
        Level::Info => " INF ".black().on_blue().bold().to_string(),
        Level::Debug => " DBG ".white().on_black().to_string(),
        Level::Trace => " TRC ".to_string(),
    }
}
