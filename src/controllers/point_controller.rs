use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::point_dto::{CreatePointRequest, ListPointsQuery, PointResponse, UpdatePointRequest};
use crate::models::{Point, PointPatch};
use crate::repositories::PointRepository;
use crate::services::geocoding_service::GeocodingService;
use crate::services::point_pipeline::{build_new_point, build_patch, compose_geocoding_query};
use crate::utils::errors::{not_found_error, AppError, AppResult, PipelineStage};

/// Pipeline de escritura de puntos: normaliza, geocodifica, persiste y
/// devuelve el documento sin campos heredados.
pub struct PointController {
    repository: Arc<dyn PointRepository>,
    geocoder: Arc<GeocodingService>,
}

impl PointController {
    pub fn new(repository: Arc<dyn PointRepository>, geocoder: Arc<GeocodingService>) -> Self {
        Self {
            repository,
            geocoder,
        }
    }

    pub async fn create(&self, request: CreatePointRequest) -> AppResult<PointResponse> {
        request.validate()?;

        let mut point = build_new_point(&request);

        if point.latitud.is_none() || point.longitud.is_none() {
            let query = compose_geocoding_query(
                point.direccion_completa.as_deref(),
                point.comuna_nombre.as_deref(),
                point.region_nombre.as_deref(),
            );

            match query {
                Some(query) => {
                    if let Some(coords) = self.geocoder.resolve(&query).await {
                        point.latitud = Some(coords.latitude);
                        point.longitud = Some(coords.longitude);
                    }
                }
                None => warn!("⚠️ Punto sin dirección, se guarda sin coordenadas"),
            }
        }

        let id = self
            .repository
            .create(point)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Save))?;

        let saved = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Reload))?
            .ok_or_else(|| AppError::Pipeline {
                stage: PipelineStage::Reload,
                message: format!("Punto {} no encontrado tras crearlo", id),
            })?;

        info!("✅ Punto creado: {}", id);
        Ok(PointResponse::from(saved))
    }

    pub async fn update(&self, id: Uuid, request: UpdatePointRequest) -> AppResult<PointResponse> {
        request.validate()?;

        let mut patch = build_patch(&request)?;

        if needs_geocoding(&patch) {
            let current = self
                .repository
                .find_by_id(id)
                .await
                .map_err(|e| e.at_stage(PipelineStage::Find))?
                .ok_or_else(|| not_found_error("Punto", &id.to_string()))?;

            if let Some(query) = merged_geocoding_query(&patch, &current) {
                if let Some(coords) = self.geocoder.resolve(&query).await {
                    patch.latitud = Some(Some(coords.latitude));
                    patch.longitud = Some(Some(coords.longitude));
                }
            }
        }

        let updated = self
            .repository
            .update(id, patch)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Update))?
            .ok_or_else(|| not_found_error("Punto", &id.to_string()))?;

        info!("✅ Punto actualizado: {}", id);
        Ok(PointResponse::from(updated))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Delete))?;

        if !deleted {
            return Err(not_found_error("Punto", &id.to_string()));
        }

        info!("🗑️ Punto eliminado: {}", id);
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<PointResponse> {
        let point = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Find))?
            .ok_or_else(|| not_found_error("Punto", &id.to_string()))?;

        Ok(PointResponse::from(point))
    }

    pub async fn list(&self, query: ListPointsQuery) -> AppResult<Vec<PointResponse>> {
        let points = self
            .repository
            .list(query.region.as_deref())
            .await
            .map_err(|e| e.at_stage(PipelineStage::List))?;

        Ok(points.into_iter().map(PointResponse::from).collect())
    }
}

/// Hay que geocodificar si cambia la dirección y no llegan ambas coordenadas
fn needs_geocoding(patch: &PointPatch) -> bool {
    let has_coordinates = matches!(
        (patch.latitud, patch.longitud),
        (Some(Some(_)), Some(Some(_)))
    );
    patch.changes_address() && !has_coordinates
}

/// Consulta con la dirección resultante: lo que trae el parche sobre lo guardado
fn merged_geocoding_query(patch: &PointPatch, current: &Point) -> Option<String> {
    let direccion = match &patch.direccion_completa {
        Some(v) => v.as_deref(),
        None => current.direccion_completa.as_deref(),
    };
    let comuna = match &patch.comuna_nombre {
        Some(v) => v.as_deref(),
        None => current.comuna_nombre.as_deref(),
    };
    let region = match &patch.region_nombre {
        Some(v) => v.as_deref(),
        None => current.region_nombre.as_deref(),
    };

    compose_geocoding_query(direccion, comuna, region)
}
