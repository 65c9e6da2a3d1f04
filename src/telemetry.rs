//! Tracing bootstrap for the casework service.
//!
//! Filter precedence: an explicit `RUST_LOG` wins; otherwise the configured
//! `APP_LOG_LEVEL` applies, with hyper's connection chatter capped at warn so
//! request lines stay readable at debug level.

use thiserror::Error;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("failed to install the tracing subscriber")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn filtro_configurado(nivel: &str) -> Result<EnvFilter, TelemetryError> {
    let base = EnvFilter::try_new(nivel).map_err(|source| TelemetryError::Filter {
        value: nivel.to_string(),
        source,
    })?;
    let silenciar: Directive = "hyper=warn".parse().map_err(|source| TelemetryError::Filter {
        value: "hyper=warn".to_string(),
        source,
    })?;
    Ok(base.add_directive(silenciar))
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filtro = match EnvFilter::try_from_default_env() {
        Ok(filtro) => filtro,
        Err(_) => filtro_configurado(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filtro)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Install)
}
