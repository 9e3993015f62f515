use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::dto::point_dto::{CreatePointRequest, ListPointsQuery, PointResponse, UpdatePointRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_point_id;

pub fn create_point_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_points).post(create_point))
        .route("/crear", post(create_point))
        .route("/:id", get(get_point).put(update_point).delete(delete_point))
}

async fn list_points(
    State(state): State<AppState>,
    Query(query): Query<ListPointsQuery>,
) -> Result<Json<Vec<PointResponse>>, AppError> {
    let response = state.point_controller().list(query).await?;
    Ok(Json(response))
}

async fn create_point(
    State(state): State<AppState>,
    Json(request): Json<CreatePointRequest>,
) -> Result<(StatusCode, Json<PointResponse>), AppError> {
    let response = state.point_controller().create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PointResponse>, AppError> {
    let id = parse_point_id(&id)?;
    let response = state.point_controller().get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePointRequest>,
) -> Result<Json<PointResponse>, AppError> {
    let id = parse_point_id(&id)?;
    let response = state.point_controller().update(id, request).await?;
    Ok(Json(response))
}

async fn delete_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_point_id(&id)?;
    state.point_controller().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
