//! Normalización de puntos de reciclaje
//!
//! Operaciones puras del pipeline de escritura: región, valores por
//! defecto, materiales aceptados y construcción de la consulta de
//! geocodificación. No hacen I/O; el controlador las orquesta.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use validator::ValidationError;

use crate::dto::point_dto::{CreatePointRequest, UpdatePointRequest};
use crate::models::{NewPoint, PointPatch};
use crate::utils::errors::{validation_error, AppError};
use crate::utils::validation::{
    coordinate_from_value, valid_coordinate_pair, validate_latitude, validate_longitude,
};

pub const DEFAULT_TELEFONO: &str = "No disponible";
pub const DEFAULT_HORARIO: &str = "Horario no especificado";
pub const DEFAULT_ENCARGADO: &str = "Municipal";
pub const DEFAULT_ADMINISTRADOR: &str = "DEMARCO";
pub const DEFAULT_NOMBRE_PUNTO: &str = "Punto Reciclaje";

const GEOCODING_COUNTRY: &str = "Chile";

lazy_static! {
    // "Metropolitana de Santiago (RM)" -> ("Metropolitana de Santiago", "RM")
    static ref REGION_WITH_ABBREVIATION: Regex =
        Regex::new(r"^\s*(.*?)\s*\(\s*([^()]*?)\s*\)\s*$").expect("region regex is valid");
}

/// Región normalizada: nombre sin paréntesis y abreviatura opcional
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRegion {
    pub nombre: String,
    pub abreviatura: Option<String>,
}

/// Devuelve el valor recortado si no está vacío
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Valor recortado o el default fijo si viene vacío o ausente
pub fn value_or_default(value: Option<&str>, default: &str) -> String {
    non_blank(value).unwrap_or_else(|| default.to_string())
}

/// Separa "Nombre (ABR)" en nombre y abreviatura.
///
/// La abreviatura extraída sólo se usa cuando no viene una ya informada.
/// Sin paréntesis el nombre pasa recortado y no se infiere abreviatura.
pub fn normalize_region(raw: &str, existing_abbreviation: Option<&str>) -> NormalizedRegion {
    let existing = non_blank(existing_abbreviation);

    if let Some(caps) = REGION_WITH_ABBREVIATION.captures(raw) {
        let nombre = caps.get(1).map_or("", |m| m.as_str().trim());
        let extracted = non_blank(caps.get(2).map(|m| m.as_str()));
        return NormalizedRegion {
            nombre: nombre.to_string(),
            abreviatura: existing.or(extracted),
        };
    }

    NormalizedRegion {
        nombre: raw.trim().to_string(),
        abreviatura: existing,
    }
}

/// Normaliza la lista de materiales.
///
/// `None` significa "no se enviaron materiales" (valor ausente o que no es
/// un arreglo). Un arreglo se convierte en strings recortados, sin vacíos,
/// conservando orden y duplicados.
pub fn normalize_materials(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;

    let materials = items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .filter(|m| !m.is_empty())
        .collect();

    Some(materials)
}

/// Construye "<direccion>, <comuna>, <region>, Chile" omitiendo componentes vacíos.
///
/// Devuelve `None` si no hay ningún componente de dirección.
pub fn compose_geocoding_query(
    direccion: Option<&str>,
    comuna: Option<&str>,
    region: Option<&str>,
) -> Option<String> {
    let parts: Vec<String> = [direccion, comuna, region]
        .into_iter()
        .filter_map(non_blank)
        .collect();

    if parts.is_empty() {
        return None;
    }

    Some(format!("{}, {}", parts.join(", "), GEOCODING_COUNTRY))
}

/// Construye el documento normalizado de creación.
///
/// Las coordenadas sólo se copian si ambas son válidas; si no, quedan
/// vacías para que el controlador intente geocodificar.
pub fn build_new_point(request: &CreatePointRequest) -> NewPoint {
    let region = request
        .region_nombre
        .as_deref()
        .map(|raw| normalize_region(raw, request.region_abreviatura.as_deref()));

    let (region_nombre, region_abreviatura) = match region {
        Some(r) => (Some(r.nombre).filter(|n| !n.is_empty()), r.abreviatura),
        None => (None, non_blank(request.region_abreviatura.as_deref())),
    };

    let latitud = request.latitud.as_ref().and_then(coordinate_from_value);
    let longitud = request.longitud.as_ref().and_then(coordinate_from_value);
    let coordinates = valid_coordinate_pair(latitud, longitud);

    NewPoint {
        nombre_punto: value_or_default(request.nombre_punto.as_deref(), DEFAULT_NOMBRE_PUNTO),
        encargado: value_or_default(request.encargado.as_deref(), DEFAULT_ENCARGADO),
        administrador: value_or_default(request.administrador.as_deref(), DEFAULT_ADMINISTRADOR),
        direccion_completa: non_blank(request.direccion_completa.as_deref()),
        tipo_via: non_blank(request.tipo_via.as_deref()),
        nombre_via: non_blank(request.nombre_via.as_deref()),
        comuna_id: request.comuna_id,
        comuna_nombre: non_blank(request.comuna_nombre.as_deref()),
        region_id: request.region_id,
        region_nombre,
        region_abreviatura,
        latitud: coordinates.map(|(lat, _)| lat),
        longitud: coordinates.map(|(_, lng)| lng),
        telefono: value_or_default(request.telefono.as_deref(), DEFAULT_TELEFONO),
        horario: value_or_default(request.horario.as_deref(), DEFAULT_HORARIO),
        materiales_aceptados: normalize_materials(request.materiales_aceptados.as_ref())
            .unwrap_or_default(),
    }
}

/// Convierte una coordenada presente en el body de actualización y valida su rango
fn patch_coordinate(
    value: Option<&Value>,
    field: &'static str,
    check_range: fn(f64) -> Result<(), ValidationError>,
) -> Result<Option<Option<f64>>, AppError> {
    match value {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(v) => {
            let coordinate =
                coordinate_from_value(v).ok_or_else(|| validation_error(field, "Coordenada inválida"))?;
            check_range(coordinate).map_err(|_| validation_error(field, "Coordenada fuera de rango"))?;
            Ok(Some(Some(coordinate)))
        }
    }
}

/// Campo de texto de ubicación presente en el body: se recorta y se escribe tal cual
fn patch_text(value: &Option<Option<String>>) -> Option<Option<String>> {
    value.as_ref().map(|v| v.as_deref().map(|s| s.trim().to_string()))
}

/// Construye el conjunto parcial de cambios de una actualización.
///
/// Los cinco campos con default sólo se escriben si vienen con contenido;
/// los campos de ubicación se escriben si están presentes, aunque vengan
/// vacíos; los materiales sólo si llega un arreglo.
pub fn build_patch(request: &UpdatePointRequest) -> Result<PointPatch, AppError> {
    let mut patch = PointPatch {
        nombre_punto: non_blank(request.nombre_punto.as_deref()),
        encargado: non_blank(request.encargado.as_deref()),
        administrador: non_blank(request.administrador.as_deref()),
        telefono: non_blank(request.telefono.as_deref()),
        horario: non_blank(request.horario.as_deref()),
        direccion_completa: patch_text(&request.direccion_completa),
        tipo_via: patch_text(&request.tipo_via),
        nombre_via: patch_text(&request.nombre_via),
        comuna_id: request.comuna_id,
        comuna_nombre: patch_text(&request.comuna_nombre),
        region_id: request.region_id,
        // Una abreviatura en blanco no cuenta como informada
        region_abreviatura: request
            .region_abreviatura
            .as_ref()
            .map(|v| non_blank(v.as_deref())),
        latitud: patch_coordinate(request.latitud.as_ref(), "latitud", validate_latitude)?,
        longitud: patch_coordinate(request.longitud.as_ref(), "longitud", validate_longitude)?,
        materiales_aceptados: normalize_materials(request.materiales_aceptados.as_ref()),
        ..Default::default()
    };

    match &request.region_nombre {
        Some(Some(raw)) => {
            let supplied = request.region_abreviatura.as_ref().and_then(|v| v.as_deref());
            let region = normalize_region(raw, supplied);
            if let Some(abbr) = region.abreviatura {
                patch.region_abreviatura = Some(Some(abbr));
            }
            patch.region_nombre = Some(Some(region.nombre));
        }
        Some(None) => patch.region_nombre = Some(None),
        None => {}
    }

    Ok(patch)
}
