//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Initialize JSON logging filtered by `service.log_level`
///
/// An invalid filter directive falls back to `info`. Returns an error when a
/// global subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|error| {
        eprintln!(
            "invalid log level {:?} ({error}), falling back to info",
            config.service.log_level
        );
        EnvFilter::new("info")
    });

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to initialize tracing: {e}")))?;

    tracing::info!(
        service = %config.service.name,
        environment = %config.service.environment,
        "tracing initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_is_an_error() {
        let mut config = Config::default();
        config.service.log_level = "not a [valid directive".to_string();

        // The first call may lose the race with another test's subscriber
        let _ = init_tracing(&config);
        assert!(matches!(init_tracing(&config), Err(Error::Internal(_))));
    }
}
