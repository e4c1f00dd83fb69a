//! Console logging for the host binary, backed by `env_logger`.
//!
//! The library itself only emits through `log`; whoever owns `main`
//! decides where records go.

use env_logger::{Builder, Env, Target};
use log::{LevelFilter, SetLoggerError};

/// Environment variable holding the filter (`error` .. `trace`, or
/// `env_logger` directives such as `intersection::fsm=debug`).
pub const LEVEL_ENV: &str = "INTERSECTION_LOG";

const DEFAULT_FILTER: &str = "info";

/// Builder reading its filter from [`LEVEL_ENV`].
pub fn builder() -> Builder {
    builder_from(Env::new().filter_or(LEVEL_ENV, DEFAULT_FILTER))
}

fn builder_from(env: Env<'_>) -> Builder {
    let mut builder = Builder::from_env(env);
    builder.target(Target::Stdout).format_timestamp_millis();
    builder
}

/// Install the console logger and return the active maximum level.
pub fn init() -> Result<LevelFilter, SetLoggerError> {
    builder().try_init()?;
    Ok(log::max_level())
}
