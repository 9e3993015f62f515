use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::environment::EnvironmentConfig;

/// Coordenadas resueltas por un proveedor de geocodificación
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Capacidad común de los proveedores: dirección libre -> coordenada opcional.
///
/// `Ok(None)` significa "sin resultados"; `Err` cubre red, status no-OK y
/// respuestas que no se pueden parsear. Ambos casos hacen que la cadena
/// pase al siguiente proveedor.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>>;
}

#[derive(Debug, Deserialize)]
struct MapboxGeocodingResponse {
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    geometry: MapboxGeometry,
}

#[derive(Debug, Deserialize)]
struct MapboxGeometry {
    coordinates: Vec<f64>, // [longitude, latitude]
}

/// Proveedor primario (requiere token de Mapbox)
pub struct MapboxProvider {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl MapboxProvider {
    pub fn new(base_url: String, token: String, client: reqwest::Client) -> Self {
        Self {
            base_url,
            token,
            client,
        }
    }

    fn parse_response(body: &str) -> Result<Option<Coordinates>> {
        let response: MapboxGeocodingResponse = serde_json::from_str(body)
            .map_err(|e| anyhow!("Failed to parse Mapbox response: {}", e))?;

        // Primera feature = resultado más relevante
        Ok(response.features.first().and_then(|feature| {
            match feature.geometry.coordinates.as_slice() {
                [longitude, latitude, ..] => Some(Coordinates {
                    latitude: *latitude,
                    longitude: *longitude,
                }),
                _ => None,
            }
        }))
    }
}

#[async_trait]
impl GeocodingProvider for MapboxProvider {
    fn name(&self) -> &'static str {
        "mapbox"
    }

    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
        let url = format!(
            "{}?q={}&access_token={}&country=cl&limit=1",
            self.base_url,
            urlencoding::encode(query),
            self.token
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!("📡 Mapbox response status: {}", status);

        if !status.is_success() {
            return Err(anyhow!("Mapbox geocoding failed with status {}", status));
        }

        let body = response.text().await?;
        Self::parse_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Proveedor secundario sin clave (OpenStreetMap Nominatim)
pub struct NominatimProvider {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimProvider {
    pub fn new(base_url: String, client: reqwest::Client) -> Self {
        Self { base_url, client }
    }

    fn parse_response(body: &str) -> Result<Option<Coordinates>> {
        let places: Vec<NominatimPlace> = serde_json::from_str(body)
            .map_err(|e| anyhow!("Failed to parse Nominatim response: {}", e))?;

        let Some(place) = places.first() else {
            return Ok(None);
        };

        let latitude: f64 = place.lat.trim().parse()?;
        let longitude: f64 = place.lon.trim().parse()?;
        Ok(Some(Coordinates { latitude, longitude }))
    }
}

#[async_trait]
impl GeocodingProvider for NominatimProvider {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
        let url = format!(
            "{}?format=json&limit=1&countrycodes=cl&q={}",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!("📡 Nominatim response status: {}", status);

        if !status.is_success() {
            return Err(anyhow!("Nominatim geocoding failed with status {}", status));
        }

        let body = response.text().await?;
        Self::parse_response(&body)
    }
}

/// Cadena ordenada de proveedores: el primero que responde con coordenadas gana.
///
/// Los proveedores se consultan en secuencia, cada uno a lo sumo una vez
/// por llamada, nunca en paralelo.
#[derive(Clone)]
pub struct GeocodingService {
    providers: Vec<Arc<dyn GeocodingProvider>>,
}

impl GeocodingService {
    pub fn new(providers: Vec<Arc<dyn GeocodingProvider>>) -> Self {
        Self { providers }
    }

    /// Mapbox sólo entra en la cadena si hay token configurado
    pub fn from_config(config: &EnvironmentConfig, client: reqwest::Client) -> Self {
        let mut providers: Vec<Arc<dyn GeocodingProvider>> = Vec::new();

        match config.mapbox_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => {
                providers.push(Arc::new(MapboxProvider::new(
                    config.mapbox_geocoding_url.clone(),
                    token.to_string(),
                    client.clone(),
                )));
            }
            _ => warn!("⚠️ MAPBOX_TOKEN no configurado, se usará sólo Nominatim"),
        }

        providers.push(Arc::new(NominatimProvider::new(
            config.nominatim_url.clone(),
            client,
        )));

        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resuelve una dirección. Los fallos de los proveedores nunca se propagan.
    pub async fn resolve(&self, query: &str) -> Option<Coordinates> {
        info!("🗺️ Geocoding address: {}", query);

        for provider in &self.providers {
            match provider.geocode(query).await {
                Ok(Some(coordinates)) => {
                    info!(
                        "✅ Geocoding successful via {}: {} -> ({}, {})",
                        provider.name(),
                        query,
                        coordinates.latitude,
                        coordinates.longitude
                    );
                    return Some(coordinates);
                }
                Ok(None) => {
                    warn!("⚠️ {} sin resultados para: {}", provider.name(), query);
                }
                Err(e) => {
                    warn!("⚠️ {} falló para {}: {}", provider.name(), query, e);
                }
            }
        }

        warn!("❌ No coordinates found for address: {}", query);
        None
    }
}
