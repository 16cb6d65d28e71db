use std::io;
use std::str::FromStr;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

/// Output shape of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" | "" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn install<W>(format: LogFormat, default_filter: &str, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = fmt().with_env_filter(filter_or(default_filter)).with_target(false).with_writer(writer);
    // a second init (tests, repeated calls) is ignored
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Server logging on stdout.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
pub fn init_logging_default() {
    install(LogFormat::Compact, "info,tower_http=info,axum=info", io::stdout);
}

/// JSON structured server logging on stdout.
/// Admin credential workflow events are kept at debug for auditing.
pub fn init_logging_json() {
    install(LogFormat::Json, "info,service::auth=debug", io::stdout);
}

/// Pick the server log format by name; unknown names fall back to compact.
pub fn init_logging_named(format: Option<&str>) {
    match format.map(LogFormat::from_str) {
        Some(Ok(LogFormat::Json)) => init_logging_json(),
        _ => init_logging_default(),
    }
}

/// Operator CLI logging. Stdout belongs to command output, so events go to
/// stderr and default to `warn`.
pub fn init_logging_cli() {
    install(LogFormat::Compact, "warn", io::stderr);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" compact ".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging_cli();
        init_logging_named(Some("json"));
    }
}
