mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::DatabaseConnection;
use repositories::{PgPointRepository, PointRepository};
use services::geocoding_service::GeocodingService;
use services::legacy_cleanup_service::LegacyCleanupService;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = config
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("♻️  ReusoSmart - API de Puntos de Reciclaje");
    info!("================================================");
    if config.is_development() {
        info!("🛠️  Modo desarrollo");
    }

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let points: Arc<dyn PointRepository> =
        Arc::new(PgPointRepository::new(db_connection.pool().clone()));

    // Geocodificación: Mapbox (si hay token) y luego Nominatim
    let geocoder = GeocodingService::from_config(&config, config.geocoding_http_client()?);
    info!("🗺️ Proveedores de geocodificación: {:?}", geocoder.provider_names());

    // Limpieza de campos heredados
    let cleanup = LegacyCleanupService::new(points.clone());
    match config.legacy_purge_interval() {
        Some(interval) => {
            info!("🧹 Limpieza de campos heredados cada {:?}", interval);
            cleanup.spawn(interval);
        }
        None => {
            if let Err(e) = cleanup.run_once().await {
                error!("❌ Error limpiando campos heredados: {}", e);
            }
        }
    }

    let addr: SocketAddr = config.server_url().parse()?;
    let app_state = AppState::new(config, points, Arc::new(geocoder));
    let app = routes::create_app(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("📍 Endpoints - Puntos de reciclaje (/api/puntos y /points):");
    info!("   GET    /api/puntos?region= - Listar puntos");
    info!("   POST   /api/puntos - Crear punto");
    info!("   POST   /api/puntos/crear - Crear punto");
    info!("   GET    /api/puntos/:id - Obtener punto");
    info!("   PUT    /api/puntos/:id - Actualizar punto");
    info!("   DELETE /api/puntos/:id - Eliminar punto");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de señales: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
