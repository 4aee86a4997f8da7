#![forbid(unsafe_code)]

//! Subscriber setup for applications that do not install their own.
//!
//! `RUST_LOG` selects what is recorded (default `info`); setting
//! `KVIEW_LOG_JSON=1` switches to one JSON object per event.

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable that selects JSON output.
pub const JSON_ENV: &str = "KVIEW_LOG_JSON";

/// Output format chosen by [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
}

impl Format {
    /// Format requested by the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(JSON_ENV).ok().as_deref())
    }

    fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some("1") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install a global fmt subscriber writing to stderr.
///
/// Fails if a global subscriber is already set; the existing one stays.
pub fn init() -> Result<Format, tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = Format::from_env();
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        Format::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        Format::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
    }
    tracing::debug!(target: "kview::logging", ?format, "subscriber installed");
    Ok(format)
}
