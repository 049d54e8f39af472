use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use time::{macros::format_description, OffsetDateTime};

/// Console stream log lines go to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    Stderr,
    Off,
}

/// Logger settings, read from `WIKI_LOG*` variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: Level,
    pub console: Console,
    pub file: Option<PathBuf>,
    pub colors: bool,
}

impl LogSettings {
    /// `WIKI_LOG` (then `RUST_LOG`) picks the level, `WIKI_LOG_CONSOLE` one of
    /// `stderr`/`stdout`/`off`, `WIKI_LOG_FILE` an extra plain-text file, and
    /// `NO_COLOR` turns off ANSI colors
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = lookup("WIKI_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .and_then(|raw| raw.trim().parse::<Level>().ok())
            .unwrap_or(Level::Info);

        let console = match lookup("WIKI_LOG_CONSOLE").as_deref().map(str::trim) {
            Some("stdout") => Console::Stdout,
            Some("off") | Some("none") => Console::Off,
            _ => Console::Stderr,
        };

        Self {
            level,
            console,
            file: lookup("WIKI_LOG_FILE").map(PathBuf::from),
            colors: lookup("NO_COLOR").is_none() && console != Console::Off,
        }
    }
}

/// `log` backend writing `[HH:MM:SS] LEVEL message` lines
pub struct Logger {
    settings: LogSettings,
    file: Option<Mutex<File>>,
}

impl Logger {
    /// Build a logger. An unopenable log file is reported on stderr and
    /// skipped rather than failing startup.
    pub fn new(settings: LogSettings) -> Self {
        let file = settings.file.as_ref().and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(Mutex::new(file)),
                Err(e) => {
                    eprintln!("Cannot open log file {:?}: {}", path, e);
                    None
                }
            }
        });
        Self { settings, file }
    }

    /// Install a logger configured from the environment
    pub fn init() -> Result<(), log::SetLoggerError> {
        let settings = LogSettings::from_lookup(|key| std::env::var(key).ok());
        let level = settings.level;
        log::set_logger(Box::leak(Box::new(Logger::new(settings))))?;
        log::set_max_level(level.to_level_filter());
        Ok(())
    }

    pub fn max_level(&self) -> LevelFilter {
        self.settings.level.to_level_filter()
    }

    fn line(record: &Record, colored: bool) -> String {
        let timestamp = OffsetDateTime::now_utc()
            .format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_default();
        let level = record.level();
        if colored {
            let color = match level {
                Level::Error => 31,
                Level::Warn => 33,
                Level::Info => 36,
                Level::Debug => 35,
                Level::Trace => 37,
            };
            format!("\x1b[{color}m[{timestamp}] {level}\x1b[0m {}\n", record.args())
        } else {
            format!("[{timestamp}] {level} {}\n", record.args())
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.settings.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let console = Self::line(record, self.settings.colors);
        let _ = match self.settings.console {
            Console::Stdout => std::io::stdout().lock().write_all(console.as_bytes()),
            Console::Stderr => std::io::stderr().lock().write_all(console.as_bytes()),
            Console::Off => Ok(()),
        };

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(Self::line(record, false).as_bytes());
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}
