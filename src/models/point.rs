use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Punto de reciclaje tal como se guarda en la base de datos.
///
/// Los campos heredados (`estado`, `legacy_id`, `tipo_punto`) existen en la
/// tabla pero nunca se seleccionan en este modelo.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Point {
    pub id: Uuid,

    pub nombre_punto: Option<String>,
    pub encargado: Option<String>,
    pub administrador: Option<String>,

    // Ubicación
    pub direccion_completa: Option<String>,
    pub tipo_via: Option<String>,
    pub nombre_via: Option<String>,
    pub comuna_id: Option<i32>,
    pub comuna_nombre: Option<String>,
    pub region_id: Option<i32>,
    pub region_nombre: Option<String>,
    pub region_abreviatura: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,

    pub telefono: Option<String>,
    pub horario: Option<String>,
    pub tipo_electronico: Option<String>,
    pub materiales_aceptados: Vec<String>,

    // Metadata
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Documento normalizado listo para insertar
#[derive(Debug, Clone, PartialEq)]
pub struct NewPoint {
    pub nombre_punto: String,
    pub encargado: String,
    pub administrador: String,
    pub direccion_completa: Option<String>,
    pub tipo_via: Option<String>,
    pub nombre_via: Option<String>,
    pub comuna_id: Option<i32>,
    pub comuna_nombre: Option<String>,
    pub region_id: Option<i32>,
    pub region_nombre: Option<String>,
    pub region_abreviatura: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub telefono: String,
    pub horario: String,
    pub materiales_aceptados: Vec<String>,
}

/// Conjunto parcial de cambios para una actualización.
///
/// `None` significa "no tocar". En los campos de ubicación `Some(None)`
/// escribe NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointPatch {
    pub nombre_punto: Option<String>,
    pub encargado: Option<String>,
    pub administrador: Option<String>,
    pub telefono: Option<String>,
    pub horario: Option<String>,
    pub direccion_completa: Option<Option<String>>,
    pub tipo_via: Option<Option<String>>,
    pub nombre_via: Option<Option<String>>,
    pub comuna_id: Option<Option<i32>>,
    pub comuna_nombre: Option<Option<String>>,
    pub region_id: Option<Option<i32>>,
    pub region_nombre: Option<Option<String>>,
    pub region_abreviatura: Option<Option<String>>,
    pub latitud: Option<Option<f64>>,
    pub longitud: Option<Option<f64>>,
    pub materiales_aceptados: Option<Vec<String>>,
}

impl PointPatch {
    /// Indica si el cambio toca algún componente de la dirección
    pub fn changes_address(&self) -> bool {
        self.direccion_completa.is_some()
            || self.comuna_nombre.is_some()
            || self.region_nombre.is_some()
    }

    /// Aplica el parche sobre un punto en memoria, con la misma semántica
    /// que el UPDATE en base de datos (incluido el borrado de `tipo_electronico`).
    #[cfg(test)]
    pub fn apply_to(&self, point: &mut Point) {
        if let Some(v) = &self.nombre_punto {
            point.nombre_punto = Some(v.clone());
        }
        if let Some(v) = &self.encargado {
            point.encargado = Some(v.clone());
        }
        if let Some(v) = &self.administrador {
            point.administrador = Some(v.clone());
        }
        if let Some(v) = &self.telefono {
            point.telefono = Some(v.clone());
        }
        if let Some(v) = &self.horario {
            point.horario = Some(v.clone());
        }
        if let Some(v) = &self.direccion_completa {
            point.direccion_completa = v.clone();
        }
        if let Some(v) = &self.tipo_via {
            point.tipo_via = v.clone();
        }
        if let Some(v) = &self.nombre_via {
            point.nombre_via = v.clone();
        }
        if let Some(v) = self.comuna_id {
            point.comuna_id = v;
        }
        if let Some(v) = &self.comuna_nombre {
            point.comuna_nombre = v.clone();
        }
        if let Some(v) = self.region_id {
            point.region_id = v;
        }
        if let Some(v) = &self.region_nombre {
            point.region_nombre = v.clone();
        }
        if let Some(v) = &self.region_abreviatura {
            point.region_abreviatura = v.clone();
        }
        if let Some(v) = self.latitud {
            point.latitud = v;
        }
        if let Some(v) = self.longitud {
            point.longitud = v;
        }
        if let Some(v) = &self.materiales_aceptados {
            point.materiales_aceptados = v.clone();
        }
        point.tipo_electronico = None;
        point.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_point() -> Point {
        Point {
            id: Uuid::new_v4(),
            nombre_punto: Some("Punto Test".to_string()),
            encargado: Some("Fundación".to_string()),
            administrador: Some("DEMARCO".to_string()),
            direccion_completa: Some("Av. Apoquindo 3000".to_string()),
            tipo_via: None,
            nombre_via: None,
            comuna_id: None,
            comuna_nombre: Some("Las Condes".to_string()),
            region_id: None,
            region_nombre: Some("Metropolitana de Santiago".to_string()),
            region_abreviatura: Some("RM".to_string()),
            latitud: Some(-33.416848),
            longitud: Some(-70.5988997),
            telefono: Some("+56 2 2345 6789".to_string()),
            horario: Some("09:00 a 18:00".to_string()),
            tipo_electronico: Some("Celular".to_string()),
            materiales_aceptados: vec!["Celular".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_patch_only_clears_tipo_electronico() {
        let mut point = sample_point();
        let before = point.clone();
        PointPatch::default().apply_to(&mut point);

        assert_eq!(point.tipo_electronico, None);
        assert_eq!(point.telefono, before.telefono);
        assert_eq!(point.materiales_aceptados, before.materiales_aceptados);
        assert_eq!(point.latitud, before.latitud);
    }

    #[test]
    fn test_patch_writes_present_location_fields() {
        let mut point = sample_point();
        let patch = PointPatch {
            direccion_completa: Some(Some(String::new())),
            latitud: Some(None),
            ..Default::default()
        };
        patch.apply_to(&mut point);

        assert_eq!(point.direccion_completa.as_deref(), Some(""));
        assert_eq!(point.latitud, None);
        assert_eq!(point.comuna_nombre.as_deref(), Some("Las Condes"));
        assert!(patch.changes_address());
    }

    #[test]
    fn test_patch_writes_street_and_ids() {
        let mut point = sample_point();
        let patch = PointPatch {
            tipo_via: Some(Some("Calle".to_string())),
            comuna_id: Some(Some(14)),
            region_id: Some(None),
            ..Default::default()
        };
        patch.apply_to(&mut point);

        assert_eq!(point.tipo_via.as_deref(), Some("Calle"));
        assert_eq!(point.comuna_id, Some(14));
        assert_eq!(point.region_id, None);
        assert_eq!(point.nombre_via, None);
    }
}
