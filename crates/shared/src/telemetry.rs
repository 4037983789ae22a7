//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::AppError;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter when it is set.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a global subscriber is
/// already installed.
pub fn init(logging: &LoggingConfig) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.filter)
            .map_err(|e| AppError::Config(format!("invalid log filter: {e}")))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    installed.map_err(|e| AppError::Internal(format!("tracing already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let logging = LoggingConfig::default();
        let _ = init(&logging);
        assert!(init(&logging).is_err());
    }

    #[test]
    fn test_invalid_filter_is_config_error() {
        let logging = LoggingConfig {
            filter: "esg_db=[".to_string(),
            json: false,
        };
        temp_env::with_var_unset("RUST_LOG", || {
            assert!(matches!(init(&logging), Err(AppError::Config(_))));
        });
    }
}
