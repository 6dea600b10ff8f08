//! Logging initialization using `tracing` and `tracing-subscriber`.
//!
//! Logging is controlled by:
//! - [`EnvFilter`]: log level filtering, from `RUST_LOG`
//! - [`LogFormat`]: output format (json, full, compact, bare, pretty), from `GEOCATALOG_LOG_FORMAT`

use std::io;
use std::str::FromStr;

use log::LevelFilter;
use tracing::{Level, dispatcher};
use tracing_log::{InterestCacheConfig, LogTracer};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Environment variable selecting the [`LogFormat`].
pub const LOG_FORMAT_ENV: &str = "GEOCATALOG_LOG_FORMAT";

/// Log output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, single-line logs.
    Full,

    /// A variant of the full-format, optimized for short line lengths (default).
    Compact,

    /// A very bare format without timestamps, spans, locations or ANSI colors.
    Bare,

    /// Multi-line logs for local development and debugging.
    Pretty,

    /// Newline-delimited JSON logs.
    Json,
}

impl LogFormat {
    /// Initialize logging according to the selected format.
    pub fn init(self, env_filter: EnvFilter) {
        let dispatch = match self {
            Self::Full => tracing_subscriber::fmt()
                .with_span_events(FmtSpan::NONE)
                .with_writer(io::stderr)
                .with_env_filter(env_filter)
                .finish()
                .into(),
            Self::Compact => tracing_subscriber::fmt()
                .compact()
                .with_span_events(FmtSpan::NONE)
                .with_writer(io::stderr)
                .with_env_filter(env_filter)
                .finish()
                .into(),
            Self::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_writer(io::stderr)
                .with_env_filter(env_filter)
                .finish()
                .into(),
            Self::Bare => tracing_subscriber::fmt()
                .compact()
                .with_span_events(FmtSpan::NONE)
                .without_time()
                .with_target(false)
                .with_ansi(false)
                .with_writer(io::stderr)
                .with_env_filter(env_filter)
                .finish()
                .into(),
            Self::Json => tracing_subscriber::fmt()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(io::stderr)
                .with_env_filter(env_filter)
                .finish()
                .into(),
        };
        // `SubscriberInitExt::init()` would also install its own `LogTracer`
        dispatcher::set_global_default(dispatch)
            .expect("failed to set global default subscriber");
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Compact
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            "pretty" | "verbose" => Ok(Self::Pretty),
            "bare" => Ok(Self::Bare),
            "json" | "jsonl" => Ok(Self::Json),
            _ => Err(format!(
                "Invalid log format '{s}'. Valid options: json, full, compact, bare or pretty"
            )),
        }
    }
}

/// The `log` crate level matching the most verbose level `env_filter` lets through.
fn log_level_filter(env_filter: &EnvFilter) -> Option<LevelFilter> {
    let max_level = env_filter.max_level_hint()?.into_level()?;
    Some(match max_level {
        Level::TRACE => LevelFilter::Trace,
        Level::DEBUG => LevelFilter::Debug,
        Level::INFO => LevelFilter::Info,
        Level::WARN => LevelFilter::Warn,
        Level::ERROR => LevelFilter::Error,
    })
}

/// Initialize the log -> tracing bridge, used by `reqwest` and its dependencies.
fn init_log_bridge(env_filter: &EnvFilter) {
    let mut log_builder =
        LogTracer::builder().with_interest_cache(InterestCacheConfig::default());
    if let Some(max_level) = log_level_filter(env_filter) {
        log_builder = log_builder.with_max_level(max_level);
    }
    log_builder
        .init()
        .expect("failed to initialize log -> tracing bridge: LogTracer already set");
}

/// Initialize the global tracing subscriber for the given filter and format.
///
/// Logs are written to stderr, so that a module printed to stdout stays parseable.
pub fn init_tracing(filter: &str, format: Option<String>) {
    let env_filter = EnvFilter::from_str(filter).unwrap_or_else(|_| {
        eprintln!("Warning: Invalid filter string '{filter}' passed, falling back to debug");
        EnvFilter::new("debug")
    });

    let log_format = format
        .and_then(|s| {
            s.parse::<LogFormat>()
                .map_err(|e| {
                    eprintln!("Warning: {e}");
                    eprintln!(
                        "Falling back to default format ({:?})",
                        LogFormat::default()
                    );
                })
                .ok()
        })
        .unwrap_or_default();

    init_log_bridge(&env_filter);
    log_format.init(env_filter);
}

/// Ensures that the log level for `geocatalog_core` matches the log level for `replacement`.
#[must_use]
pub fn ensure_core_log_level_matches(
    env_filter: Option<String>,
    replacement: &'static str,
) -> String {
    let Some(rust_log) = env_filter else {
        return format!("{replacement}info,geocatalog_core=info");
    };
    if rust_log.contains(replacement)
        && !rust_log.contains("geocatalog_core=")
        && let Some(level) = rust_log
            .split(',')
            .find_map(|s| s.strip_prefix(replacement))
    {
        return format!("{rust_log},geocatalog_core={level}");
    }
    rust_log
}
