//! Limpieza de campos heredados
//!
//! Los puntos importados del almacenamiento anterior traen `estado`, un `id`
//! numérico y `tipo_punto`. Esos valores no son válidos: se borran al
//! arrancar y luego de forma periódica.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::repositories::PointRepository;
use crate::utils::errors::AppResult;

pub struct LegacyCleanupService {
    repository: Arc<dyn PointRepository>,
}

impl LegacyCleanupService {
    pub fn new(repository: Arc<dyn PointRepository>) -> Self {
        Self { repository }
    }

    /// Ejecuta una pasada de limpieza y devuelve las filas tocadas
    pub async fn run_once(&self) -> AppResult<u64> {
        let counts = self.repository.count_legacy_fields().await?;
        if counts.with_estado == 0 && counts.with_legacy_id == 0 && counts.with_tipo_punto == 0 {
            return Ok(0);
        }

        info!(
            "🧹 Campos heredados encontrados: estado={}, id={}, tipo_punto={}",
            counts.with_estado, counts.with_legacy_id, counts.with_tipo_punto
        );

        let purged = self.repository.purge_legacy_fields().await?;
        info!("🧹 Limpieza de campos heredados: {} puntos actualizados", purged);
        Ok(purged)
    }

    /// Lanza la tarea periódica. El primer tick ocurre de inmediato.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!("❌ Error limpiando campos heredados: {}", e);
                }
            }
        })
    }
}
