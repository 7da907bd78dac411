//! Structured logging setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and one `fmt`
//! layer in the configured format. `CRMDESK_LOG` overrides the configured
//! level with any `EnvFilter` directive string.

use std::io;

use crmdesk_domain::{CrmDeskError, LogFormat, LoggingConfig, Result};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding filter directives
pub const LOG_ENV_VAR: &str = "CRMDESK_LOG";

/// Initialize the global subscriber.
///
/// # Errors
/// `CrmDeskError::Config` for an unparsable filter, `CrmDeskError::Internal`
/// when a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(std::env::var(LOG_ENV_VAR).ok().as_deref(), &config.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE).with_writer(io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
            .try_init(),
    };

    installed.map_err(|e| CrmDeskError::Internal(format!("tracing already initialized: {e}")))?;
    tracing::debug!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}

/// Filter from `directives` when set and non-blank, otherwise `fallback`.
fn build_filter(directives: Option<&str>, fallback: &str) -> Result<EnvFilter> {
    let source = directives.map(str::trim).filter(|d| !d.is_empty()).unwrap_or(fallback);

    EnvFilter::try_new(source)
        .map_err(|e| CrmDeskError::Config(format!("Invalid log filter '{source}': {e}")))
}
