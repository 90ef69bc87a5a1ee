// this_file: src/logging.rs
//! Stderr logging setup and stage timing

use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use std::io::Write;
use std::time::Instant;

/// How the CLI wants log lines filtered and formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub timestamps: bool,
}

impl LogConfig {
    /// Build from the `--log-level` and `--quiet` flags; quiet wins.
    pub fn from_flags(level: &str, quiet: bool) -> Self {
        let level = if quiet {
            LevelFilter::Error
        } else {
            parse_level(level)
        };
        Self {
            level,
            timestamps: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: if cfg!(debug_assertions) {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            timestamps: true,
        }
    }
}

/// Map a level name to a filter, falling back to `Info` on unknown names.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => {
            eprintln!("Invalid log level '{}', using 'info'", level);
            LevelFilter::Info
        }
    }
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m",
        Level::Warn => "\x1b[33m",
        Level::Info => "\x1b[32m",
        Level::Debug => "\x1b[34m",
        Level::Trace => "\x1b[35m",
    }
}

/// Install the global logger. `RUST_LOG` directives override the level.
///
/// Everything goes to stderr: stdout carries JSON result lines. Calling this
/// a second time is a no-op.
pub fn init_logging(config: LogConfig) {
    let mut builder = Builder::new();
    builder.filter_level(config.level);
    if let Ok(directives) = std::env::var("RUST_LOG") {
        builder.parse_filters(&directives);
    }

    let timestamps = config.timestamps;
    builder.format(move |buf, record| {
        if timestamps {
            write!(buf, "{} ", chrono::Local::now().format("%H:%M:%S%.3f"))?;
        }
        writeln!(
            buf,
            "{}{:5}\x1b[0m [{}] {}",
            level_color(record.level()),
            record.level(),
            record.target(),
            record.args()
        )
    });

    builder.target(Target::Stderr);
    let _ = builder.try_init();
}

/// Times an operation and the stages inside it.
///
/// Stage laps are logged at trace level, the total at debug level on drop.
pub struct Timer {
    name: String,
    start: Instant,
    lap: Instant,
}

impl Timer {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            name: name.into(),
            start: now,
            lap: now,
        }
    }

    /// Milliseconds since the timer started
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Log the time spent since the previous lap and return it in ms.
    pub fn lap(&mut self, stage: &str) -> f64 {
        let ms = self.lap.elapsed().as_secs_f64() * 1000.0;
        self.lap = Instant::now();
        log::trace!("{}: {} took {:.3}ms", self.name, stage, ms);
        ms
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::debug!("{} completed in {:.3}ms", self.name, self.elapsed_ms());
    }
}
