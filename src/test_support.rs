//! Dobles de prueba: repositorio en memoria y proveedores de geocodificación guionados.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{NewPoint, Point, PointPatch};
use crate::repositories::point_repository::LegacyFieldCounts;
use crate::repositories::PointRepository;
use crate::services::geocoding_service::{Coordinates, GeocodingProvider, GeocodingService};
use crate::utils::errors::AppError;

#[derive(Debug, Clone, Default)]
struct LegacyFields {
    estado: Option<String>,
    legacy_id: Option<i32>,
    tipo_punto: Option<String>,
}

impl LegacyFields {
    fn is_empty(&self) -> bool {
        self.estado.is_none() && self.legacy_id.is_none() && self.tipo_punto.is_none()
    }
}

/// Repositorio en memoria con la misma semántica que `PgPointRepository`
#[derive(Default)]
pub struct InMemoryPointRepository {
    points: Mutex<Vec<Point>>,
    legacy: Mutex<HashMap<Uuid, LegacyFields>>,
    fail_writes: AtomicBool,
}

impl InMemoryPointRepository {
    pub fn len(&self) -> usize {
        self.points.lock().unwrap().len()
    }

    /// Hace que create/update/delete fallen como si se perdiera la conexión
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Inserta un punto como los importados del almacenamiento anterior
    pub fn insert_legacy_point(
        &self,
        nombre: &str,
        estado: Option<&str>,
        legacy_id: Option<i32>,
        tipo_punto: Option<&str>,
    ) -> Uuid {
        let now = Utc::now();
        let point = Point {
            id: Uuid::new_v4(),
            nombre_punto: Some(nombre.to_string()),
            encargado: None,
            administrador: None,
            direccion_completa: None,
            tipo_via: None,
            nombre_via: None,
            comuna_id: None,
            comuna_nombre: None,
            region_id: None,
            region_nombre: None,
            region_abreviatura: None,
            latitud: None,
            longitud: None,
            telefono: None,
            horario: None,
            tipo_electronico: None,
            materiales_aceptados: vec![],
            created_at: now,
            updated_at: now,
        };
        let id = point.id;

        self.points.lock().unwrap().push(point);
        self.legacy.lock().unwrap().insert(
            id,
            LegacyFields {
                estado: estado.map(str::to_string),
                legacy_id,
                tipo_punto: tipo_punto.map(str::to_string),
            },
        );
        id
    }

    pub fn set_tipo_electronico(&self, id: Uuid, value: &str) {
        let mut points = self.points.lock().unwrap();
        if let Some(point) = points.iter_mut().find(|p| p.id == id) {
            point.tipo_electronico = Some(value.to_string());
        }
    }

    fn check_writes(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl PointRepository for InMemoryPointRepository {
    async fn create(&self, point: NewPoint) -> Result<Uuid, AppError> {
        self.check_writes()?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        self.points.lock().unwrap().push(Point {
            id,
            nombre_punto: Some(point.nombre_punto),
            encargado: Some(point.encargado),
            administrador: Some(point.administrador),
            direccion_completa: point.direccion_completa,
            tipo_via: point.tipo_via,
            nombre_via: point.nombre_via,
            comuna_id: point.comuna_id,
            comuna_nombre: point.comuna_nombre,
            region_id: point.region_id,
            region_nombre: point.region_nombre,
            region_abreviatura: point.region_abreviatura,
            latitud: point.latitud,
            longitud: point.longitud,
            telefono: Some(point.telefono),
            horario: Some(point.horario),
            tipo_electronico: None,
            materiales_aceptados: point.materiales_aceptados,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Point>, AppError> {
        Ok(self.points.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, region: Option<&str>) -> Result<Vec<Point>, AppError> {
        let filter = region
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty());

        Ok(self
            .points
            .lock()
            .unwrap()
            .iter()
            .filter(|p| match &filter {
                Some(f) => p
                    .region_nombre
                    .as_deref()
                    .map_or(false, |r| r.to_lowercase().contains(f.as_str())),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, patch: PointPatch) -> Result<Option<Point>, AppError> {
        self.check_writes()?;

        let mut points = self.points.lock().unwrap();
        Ok(points.iter_mut().find(|p| p.id == id).map(|point| {
            patch.apply_to(point);
            point.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_writes()?;

        let mut points = self.points.lock().unwrap();
        let before = points.len();
        points.retain(|p| p.id != id);
        self.legacy.lock().unwrap().remove(&id);
        Ok(points.len() < before)
    }

    async fn count_legacy_fields(&self) -> Result<LegacyFieldCounts, AppError> {
        let legacy = self.legacy.lock().unwrap();
        let count = |f: fn(&LegacyFields) -> bool| legacy.values().filter(|l| f(l)).count() as i64;

        Ok(LegacyFieldCounts {
            with_estado: count(|l| l.estado.is_some()),
            with_legacy_id: count(|l| l.legacy_id.is_some()),
            with_tipo_punto: count(|l| l.tipo_punto.is_some()),
        })
    }

    async fn purge_legacy_fields(&self) -> Result<u64, AppError> {
        let mut legacy = self.legacy.lock().unwrap();
        let mut touched = 0;
        for fields in legacy.values_mut() {
            if !fields.is_empty() {
                *fields = LegacyFields::default();
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Found(Coordinates),
    Empty,
    Fail,
}

/// Proveedor de geocodificación con respuesta fija que registra sus llamadas
pub struct ScriptedProvider {
    name: &'static str,
    outcome: Outcome,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn with_outcome(name: &'static str, outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            name,
            outcome,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn found(name: &'static str, latitude: f64, longitude: f64) -> Arc<Self> {
        Self::with_outcome(name, Outcome::Found(Coordinates { latitude, longitude }))
    }

    pub fn empty(name: &'static str) -> Arc<Self> {
        Self::with_outcome(name, Outcome::Empty)
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Self::with_outcome(name, Outcome::Fail)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeocodingProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn geocode(&self, query: &str) -> anyhow::Result<Option<Coordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());

        match self.outcome {
            Outcome::Found(coords) => Ok(Some(coords)),
            Outcome::Empty => Ok(None),
            Outcome::Fail => Err(anyhow!("{} unavailable", self.name)),
        }
    }
}

/// Cadena de geocodificación con los proveedores en el orden dado
pub fn geocoder_chain(providers: Vec<Arc<ScriptedProvider>>) -> GeocodingService {
    GeocodingService::new(
        providers
            .into_iter()
            .map(|p| p as Arc<dyn GeocodingProvider>)
            .collect(),
    )
}
