//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: configuración, repositorio de puntos y
//! cadena de geocodificación, inyectados desde `main`.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::controllers::point_controller::PointController;
use crate::repositories::PointRepository;
use crate::services::geocoding_service::GeocodingService;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub points: Arc<dyn PointRepository>,
    pub geocoder: Arc<GeocodingService>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        points: Arc<dyn PointRepository>,
        geocoder: Arc<GeocodingService>,
    ) -> Self {
        Self {
            config,
            points,
            geocoder,
        }
    }

    /// Controlador de puntos con las dependencias del estado
    pub fn point_controller(&self) -> PointController {
        PointController::new(self.points.clone(), self.geocoder.clone())
    }
}
