use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::models::Point;

/// Distingue "campo ausente" (`None`) de "campo presente", aunque sea `null`
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// Request para crear un punto de reciclaje
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreatePointRequest {
    #[validate(length(max = 200))]
    pub nombre_punto: Option<String>,
    #[validate(length(max = 200))]
    pub encargado: Option<String>,
    #[validate(length(max = 200))]
    pub administrador: Option<String>,
    #[validate(length(max = 500))]
    pub direccion_completa: Option<String>,
    pub tipo_via: Option<String>,
    pub nombre_via: Option<String>,
    pub comuna_id: Option<i32>,
    #[validate(length(max = 200))]
    pub comuna_nombre: Option<String>,
    pub region_id: Option<i32>,
    #[validate(length(max = 200))]
    pub region_nombre: Option<String>,
    #[validate(length(max = 20))]
    pub region_abreviatura: Option<String>,
    pub latitud: Option<Value>,
    pub longitud: Option<Value>,
    #[validate(length(max = 50))]
    pub telefono: Option<String>,
    #[validate(length(max = 100))]
    pub horario: Option<String>,
    pub materiales_aceptados: Option<Value>,
}

// Request para actualizar un punto (todos los campos opcionales)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePointRequest {
    #[validate(length(max = 200))]
    pub nombre_punto: Option<String>,
    #[validate(length(max = 200))]
    pub encargado: Option<String>,
    #[validate(length(max = 200))]
    pub administrador: Option<String>,
    #[validate(length(max = 50))]
    pub telefono: Option<String>,
    #[validate(length(max = 100))]
    pub horario: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub direccion_completa: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub tipo_via: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub nombre_via: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub comuna_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub comuna_nombre: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub region_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub region_nombre: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub region_abreviatura: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub latitud: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub longitud: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub materiales_aceptados: Option<Value>,
}

// Query para listar puntos
#[derive(Debug, Default, Deserialize)]
pub struct ListPointsQuery {
    pub region: Option<String>,
}

// Response de punto (sin campos heredados)
#[derive(Debug, Serialize)]
pub struct PointResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub nombre_punto: Option<String>,
    pub encargado: Option<String>,
    pub administrador: Option<String>,
    pub direccion_completa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_via: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre_via: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comuna_id: Option<i32>,
    pub comuna_nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<i32>,
    pub region_nombre: Option<String>,
    pub region_abreviatura: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitud: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitud: Option<f64>,
    pub telefono: Option<String>,
    pub horario: Option<String>,
    pub tipo_electronico: Option<String>,
    pub materiales_aceptados: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Point> for PointResponse {
    fn from(p: Point) -> Self {
        Self {
            id: p.id,
            nombre_punto: p.nombre_punto,
            encargado: p.encargado,
            administrador: p.administrador,
            direccion_completa: p.direccion_completa,
            tipo_via: p.tipo_via,
            nombre_via: p.nombre_via,
            comuna_id: p.comuna_id,
            comuna_nombre: p.comuna_nombre,
            region_id: p.region_id,
            region_nombre: p.region_nombre,
            region_abreviatura: p.region_abreviatura,
            latitud: p.latitud,
            longitud: p.longitud,
            telefono: p.telefono,
            horario: p.horario,
            tipo_electronico: p.tipo_electronico,
            materiales_aceptados: p.materiales_aceptados,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
