//! Utilidades de validación
//!
//! Funciones helper para validar identificadores y coordenadas
//! que llegan en las peticiones de puntos de reciclaje.

use serde_json::Value;
use uuid::Uuid;
use validator::ValidationError;

use crate::utils::errors::AppError;

/// Validar y convertir string a UUID
pub fn validate_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
        error
    })
}

/// Convierte el identificador de la ruta en UUID o devuelve un error de cliente
pub fn parse_point_id(value: &str) -> Result<Uuid, AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest("ID de punto requerido".to_string()));
    }
    validate_uuid(value).map_err(|_| AppError::BadRequest(format!("ID de punto inválido: '{}'", value)))
}

/// Validar formato de coordenadas GPS
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    validate_latitude(lat)?;
    validate_longitude(lng)
}

pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    check_range("latitude", lat, 90.0)
}

pub fn validate_longitude(lng: f64) -> Result<(), ValidationError> {
    check_range("longitude", lng, 180.0)
}

fn check_range(code: &'static str, value: f64, limit: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        return Ok(());
    }
    let mut error = ValidationError::new(code);
    error.add_param("value".into(), &value);
    error.add_param("range".into(), &format!("-{:.1} to {:.1}", limit, limit));
    Err(error)
}

/// Interpreta un valor JSON como coordenada numérica.
///
/// Acepta números y strings numéricos (los formularios antiguos envían
/// "-33.41"); cualquier otra cosa se considera ausente.
pub fn coordinate_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Devuelve el par (latitud, longitud) sólo si ambos son coordenadas válidas
pub fn valid_coordinate_pair(latitud: Option<f64>, longitud: Option<f64>) -> Option<(f64, f64)> {
    match (latitud, longitud) {
        (Some(lat), Some(lng)) if validate_coordinates(lat, lng).is_ok() => Some((lat, lng)),
        _ => None,
    }
}
