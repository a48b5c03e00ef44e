//! Logging setup
//!
//! Installs a `tracing-subscriber` formatter whose filter is taken from
//! `LOG_LEVEL` (loaded from `.env` when present), then `RUST_LOG`, then `info`.

use crate::constant::LOG_LEVEL_ENV;
use tracing_subscriber::EnvFilter;

/// Initialise the global subscriber. Calling it more than once is harmless.
pub fn init() {
    // A missing .env is the common case
    let _ = dotenvy::dotenv();

    let filter = build_filter(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn build_filter(log_level: Option<&str>) -> EnvFilter {
    if let Some(level) = log_level.map(str::trim).filter(|l| !l.is_empty())
        && let Ok(filter) = EnvFilter::try_new(level.to_ascii_lowercase())
    {
        return filter;
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_uppercase_level() {
        let filter = build_filter(Some("TRACE"));
        assert_eq!(filter.to_string(), "trace");
    }

    #[test]
    fn test_build_filter_accepts_directives() {
        let filter = build_filter(Some("particle_playground=debug"));
        assert_eq!(filter.to_string(), "particle_playground=debug");
    }
}
