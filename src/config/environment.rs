//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};

const DEFAULT_MAPBOX_GEOCODING_URL: &str = "https://api.mapbox.com/search/geocode/v6/forward";
const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const DEFAULT_USER_AGENT: &str = "ReusoSmart/1.0 (reciclaje-electronicos)";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    // Geocodificación
    pub mapbox_token: Option<String>,
    pub mapbox_geocoding_url: String,
    pub nominatim_url: String,
    pub geocoding_user_agent: String,
    pub geocoding_timeout_secs: Option<u64>,
    // Limpieza de campos heredados (0 = desactivada)
    pub legacy_purge_interval_secs: u64,
}

impl EnvironmentConfig {
    /// Cargar la configuración desde el entorno, con valores por defecto
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            environment: var_or("ENVIRONMENT", "development"),
            port: parse_or("PORT", 5000)?,
            host: var_or("HOST", "0.0.0.0"),
            log_level: var_or("LOG_LEVEL", "info"),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            mapbox_token: env::var("MAPBOX_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            mapbox_geocoding_url: var_or("MAPBOX_GEOCODING_URL", DEFAULT_MAPBOX_GEOCODING_URL),
            nominatim_url: var_or("NOMINATIM_URL", DEFAULT_NOMINATIM_URL),
            geocoding_user_agent: var_or("GEOCODING_USER_AGENT", DEFAULT_USER_AGENT),
            geocoding_timeout_secs: match env::var("GEOCODING_TIMEOUT_SECS") {
                Ok(raw) => Some(parse_value("GEOCODING_TIMEOUT_SECS", &raw)?),
                Err(_) => None,
            },
            legacy_purge_interval_secs: parse_or("LEGACY_PURGE_INTERVAL_SECS", 3600)?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Intervalo de la limpieza periódica, `None` si está desactivada
    pub fn legacy_purge_interval(&self) -> Option<Duration> {
        (self.legacy_purge_interval_secs > 0)
            .then(|| Duration::from_secs(self.legacy_purge_interval_secs))
    }

    /// Cliente HTTP compartido por los proveedores de geocodificación.
    /// Sin timeout salvo que se configure `GEOCODING_TIMEOUT_SECS`.
    pub fn geocoding_http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.geocoding_user_agent.clone());
        if let Some(secs) = self.geocoding_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            cors_origins: vec![],
            mapbox_token: None,
            mapbox_geocoding_url: DEFAULT_MAPBOX_GEOCODING_URL.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            geocoding_user_agent: DEFAULT_USER_AGENT.to_string(),
            geocoding_timeout_secs: None,
            legacy_purge_interval_secs: 0,
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        tracing::debug!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("{} must be a valid number: {}", key, e))
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u16>("PORT", " 8080 ").unwrap(), 8080);
        assert!(parse_value::<u16>("PORT", "abc").is_err());
    }

    #[test]
    fn test_legacy_purge_interval() {
        let mut config = EnvironmentConfig::for_tests();
        assert_eq!(config.legacy_purge_interval(), None);

        config.legacy_purge_interval_secs = 60;
        assert_eq!(config.legacy_purge_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_server_url() {
        let config = EnvironmentConfig::for_tests();
        assert_eq!(config.server_url(), "127.0.0.1:0");
        assert!(!config.is_development());
    }
}
