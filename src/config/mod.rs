use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::NaiveTime;

use crate::workflows::casework::{
    AgendaConfig, CaseworkConfig, PoliticaAprobacion, PoliticaVetoDocente,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub casework: CaseworkConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let agenda = match env::var("AGENDA_HORAS") {
            Ok(value) => parse_agenda_horas(&value)?,
            Err(_) => AgendaConfig::default(),
        };
        let aprobacion = match env::var("POLITICA_APROBACION") {
            Ok(value) => PoliticaAprobacion::from_label(&value)
                .ok_or(ConfigError::InvalidPolitica { value })?,
            Err(_) => PoliticaAprobacion::TodosAprobados,
        };
        let veto = match env::var("POLITICA_VETO_DOCENTE") {
            Ok(value) => PoliticaVetoDocente::from_label(&value)
                .ok_or(ConfigError::InvalidPolitica { value })?,
            Err(_) => PoliticaVetoDocente::Senalar,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            casework: CaseworkConfig {
                agenda,
                aprobacion,
                veto,
            },
        })
    }
}

/// Parses `AGENDA_HORAS` as a comma-separated list of `HH:MM` entries.
fn parse_agenda_horas(value: &str) -> Result<AgendaConfig, ConfigError> {
    let mut horas = Vec::new();
    for parte in value.split(',') {
        let hora = NaiveTime::parse_from_str(parte.trim(), "%H:%M").map_err(|_| {
            ConfigError::InvalidAgendaHoras {
                value: value.to_string(),
            }
        })?;
        horas.push(hora);
    }
    if horas.is_empty() {
        return Err(ConfigError::InvalidAgendaHoras {
            value: value.to_string(),
        });
    }
    Ok(AgendaConfig::new(horas))
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidAgendaHoras { value: String },
    InvalidPolitica { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAgendaHoras { value } => {
                write!(f, "AGENDA_HORAS must be comma-separated HH:MM entries, got '{value}'")
            }
            ConfigError::InvalidPolitica { value } => {
                write!(f, "unknown approval policy '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
