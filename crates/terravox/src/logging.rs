//! Global logging system.

use std::{backtrace::Backtrace, env, panic};

use thiserror::Error;
use tracing::{error, trace};
use tracing_subscriber::{
    filter::ParseError,
    fmt::{self, time::uptime},
    prelude::*,
    EnvFilter, Registry,
};

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A filter directive did not parse.
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// Another subscriber is already installed.
    #[error("unable to install log subscriber: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Joins the configured directives with `RUST_LOG`, which wins on conflicts.
#[must_use]
pub fn filter_directives(base: &str, env_filter: Option<&str>) -> String {
    let mut filter = base.to_owned();
    if let Some(extra) = env_filter.filter(|extra| !extra.is_empty()) {
        if !filter.is_empty() {
            filter.push(',');
        }
        filter.push_str(extra);
    }
    filter
}

/// Installs a compact stdout `tracing` subscriber.
///
/// Panic messages are routed through the logger as well.
///
/// # Errors
///
/// Fails on an unparsable filter or when a subscriber is already set.
pub fn init(base_filter: &str) -> Result<(), LoggingError> {
    let format = fmt::format()
        .compact()
        .with_timer(uptime())
        .with_line_number(true);
    let stdout_log = fmt::layer().event_format(format);

    let env_filter = env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(filter_directives(base_filter, env_filter.as_deref()))?;

    let subscriber = Registry::default().with(filter).with(stdout_log);
    tracing::subscriber::set_global_default(subscriber)?;

    panic::set_hook(Box::new(|info| {
        error!("{}", info);
        if env::var("RUST_BACKTRACE").map_or(false, |val| val == "1") {
            error!("{}", Backtrace::force_capture());
        }
    }));
    trace!("installed panic hook");
    Ok(())
}
