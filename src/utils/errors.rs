//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Etapa del pipeline de escritura de puntos en la que ocurrió un fallo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Save,
    Reload,
    Find,
    Update,
    Delete,
    List,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Save => "save",
            PipelineStage::Reload => "reload",
            PipelineStage::Find => "find",
            PipelineStage::Update => "update",
            PipelineStage::Delete => "delete",
            PipelineStage::List => "list",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Pipeline error at stage {stage}: {message}")]
    Pipeline {
        stage: PipelineStage,
        message: String,
    },
}

impl AppError {
    /// Envuelve un error inesperado con la etapa del pipeline donde ocurrió.
    /// Los errores ya clasificados (not found, validación) se conservan tal cual.
    pub fn at_stage(self, stage: PipelineStage) -> AppError {
        match self {
            AppError::NotFound(_)
            | AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::Pipeline { .. } => self,
            other => AppError::Pipeline {
                stage,
                message: other.to_string(),
            },
        }
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Database Error".to_string(),
                        message: "An error occurred while accessing the database".to_string(),
                        details: Some(json!({ "sql_error": e.to_string() })),
                        code: Some("DB_ERROR".to_string()),
                    },
                )
            }

            AppError::Validation(e) => {
                tracing::warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The provided data is invalid".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::NotFound(msg) => {
                tracing::warn!("Resource not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error: "Not Found".to_string(),
                        message: msg,
                        details: None,
                        code: Some("NOT_FOUND".to_string()),
                    },
                )
            }

            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Bad Request".to_string(),
                        message: msg,
                        details: None,
                        code: Some("BAD_REQUEST".to_string()),
                    },
                )
            }

            AppError::Pipeline { stage, message } => {
                tracing::error!("Point pipeline failed at stage '{}': {}", stage, message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Pipeline Error".to_string(),
                        message: format!("No se pudo procesar el punto ({})", stage),
                        details: Some(json!({ "stage": stage.as_str(), "reason": message })),
                        code: Some("PIPELINE_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.add_param("field".into(), &field);
    error.add_param("message".into(), &message);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_stage_wraps_unexpected_errors() {
        let err = AppError::Database(sqlx::Error::PoolClosed).at_stage(PipelineStage::Save);
        match err {
            AppError::Pipeline { stage, message } => {
                assert_eq!(stage, PipelineStage::Save);
                assert!(message.contains("closed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_at_stage_keeps_not_found() {
        let err = not_found_error("Punto", "abc").at_stage(PipelineStage::Update);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_pipeline_error_is_client_error() {
        let response = AppError::Pipeline {
            stage: PipelineStage::Update,
            message: "boom".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
