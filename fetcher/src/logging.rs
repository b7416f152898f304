//! Log backend initialisation.
//!
//! The library logs through the `log` facade; the binary installs
//! `env_logger` with a level derived from `-v`/`-q`. `RUST_LOG`, when set,
//! refines the filter on top of that level.

use log::LevelFilter;

/// Maps the CLI verbosity flags to a default log level.
///
/// # Examples
///
/// ```
/// use log::LevelFilter;
/// use thirdparty_fetch::logging::level_for;
///
/// assert_eq!(level_for(0, false), LevelFilter::Warn);
/// assert_eq!(level_for(2, false), LevelFilter::Debug);
/// assert_eq!(level_for(0, true), LevelFilter::Error);
/// ```
#[must_use]
pub const fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Builds the logger configuration without installing it.
#[must_use]
pub fn builder(verbosity: u8, quiet: bool) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(verbosity, quiet))
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env();
    builder
}

/// Installs the global logger.
///
/// A logger that is already installed is left in place.
pub fn init(verbosity: u8, quiet: bool) {
    if let Err(err) = builder(verbosity, quiet).try_init() {
        log::debug!("logger already initialised: {err}");
    }
}
