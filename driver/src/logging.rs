use core::str::FromStr;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, set_logger, set_max_level};

pub struct Logger;

impl Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => 31, // Red
            Level::Warn => 93,  // BrightYellow
            Level::Info => 37,  // White
            Level::Debug => 32, // Green
            Level::Trace => 90, // BrightBlack
        };
        eprintln!(
            "\u{1B}[{}m[{:>5}] {}\u{1B}[0m",
            color,
            record.level(),
            record.args(),
        );
    }

    fn flush(&self) {}
}

/// Install the logger at the level configured in `cpld.json`.
pub fn init() -> Result<(), SetLoggerError> {
    let level = LevelFilter::from_str(config::LOG_LEVEL).unwrap_or(LevelFilter::Info);
    init_with_level(level)
}

/// Install the logger. Fails if another logger is already installed.
pub fn init_with_level(level: LevelFilter) -> Result<(), SetLoggerError> {
    static LOGGER: Logger = Logger;
    set_logger(&LOGGER)?;
    set_max_level(level);
    Ok(())
}

/// Improved debug macro,
/// only compiled in debug mode.
#[macro_export]
macro_rules! debug_ex {
    // debug_ex!(target: "my_target", "a {} event", "log")
    (target: $target:expr, $($arg:tt)+) => {
        #[cfg(debug_assertions)]
        {
            ::log::log!(target: $target, ::log::Level::Debug, $($arg)+)
        }
    };

    // debug_ex!("a {} event", "log")
    ($($arg:tt)+) => {
        #[cfg(debug_assertions)]
        {
            ::log::log!(::log::Level::Debug, $($arg)+)
        }
    }
}

/// Debug message prefixed with the device name, like `dev_dbg()`.
#[macro_export]
macro_rules! dev_dbg {
    ($dev:expr, $($arg:tt)+) => {
        ::log::debug!("{}: {}", $dev.dev_name(), format_args!($($arg)+))
    };
}

/// Info message prefixed with the device name, like `dev_info()`.
#[macro_export]
macro_rules! dev_info {
    ($dev:expr, $($arg:tt)+) => {
        ::log::info!("{}: {}", $dev.dev_name(), format_args!($($arg)+))
    };
}

/// Warning prefixed with the device name, like `dev_warn()`.
#[macro_export]
macro_rules! dev_warn {
    ($dev:expr, $($arg:tt)+) => {
        ::log::warn!("{}: {}", $dev.dev_name(), format_args!($($arg)+))
    };
}
