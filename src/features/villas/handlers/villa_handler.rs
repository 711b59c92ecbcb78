use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::villas::dtos::{VillaCreateDto, VillaDto, VillaUpdateDto};
use crate::features::villas::routes::VILLAS_PATH;
use crate::features::villas::services::VillaService;
use crate::shared::patch::{PatchDocument, PatchOperation};
use crate::shared::types::{ApiResponse, Meta};

/// List all villas
#[utoipa::path(
    get,
    path = "/api/villas",
    responses(
        (status = 200, description = "List of villas", body = ApiResponse<Vec<VillaDto>>),
    ),
    tag = "villas"
)]
pub async fn list_villas(
    State(service): State<Arc<VillaService>>,
) -> Result<Json<ApiResponse<Vec<VillaDto>>>> {
    let villas = service.list().await?;
    let total = villas.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(villas),
        None,
        Some(Meta { total }),
    )))
}

/// Get a villa by id
#[utoipa::path(
    get,
    path = "/api/villas/{id}",
    params(
        ("id" = i32, Path, description = "Villa id")
    ),
    responses(
        (status = 200, description = "Villa found", body = ApiResponse<VillaDto>),
        (status = 400, description = "Id is 0"),
        (status = 404, description = "Villa not found")
    ),
    tag = "villas"
)]
pub async fn get_villa(
    State(service): State<Arc<VillaService>>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<VillaDto>>> {
    let villa = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(villa), None, None)))
}

/// Create a villa
///
/// The id is assigned by the server. Names are unique, ignoring case.
#[utoipa::path(
    post,
    path = "/api/villas",
    request_body = VillaCreateDto,
    responses(
        (status = 201, description = "Villa created", body = ApiResponse<VillaDto>,
            headers(("location" = String, description = "URL of the created villa"))),
        (status = 400, description = "Missing body, validation error or duplicate name")
    ),
    tag = "villas"
)]
pub async fn create_villa(
    State(service): State<Arc<VillaService>>,
    AppJson(dto): AppJson<Option<VillaCreateDto>>,
) -> Result<(
    StatusCode,
    [(header::HeaderName, String); 1],
    Json<ApiResponse<VillaDto>>,
)> {
    let villa = service.create(dto).await?;
    let location = format!("{}/{}", VILLAS_PATH, villa.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApiResponse::success(Some(villa), None, None)),
    ))
}

/// Delete a villa
#[utoipa::path(
    delete,
    path = "/api/villas/{id}",
    params(
        ("id" = i32, Path, description = "Villa id")
    ),
    responses(
        (status = 204, description = "Villa deleted"),
        (status = 400, description = "Id is 0"),
        (status = 404, description = "Villa not found")
    ),
    tag = "villas"
)]
pub async fn delete_villa(
    State(service): State<Arc<VillaService>>,
    AppPath(id): AppPath<i32>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace a villa
///
/// Every field is overwritten with the body, including fields the body leaves
/// empty.
#[utoipa::path(
    put,
    path = "/api/villas/{id}",
    params(
        ("id" = i32, Path, description = "Villa id")
    ),
    request_body = VillaUpdateDto,
    responses(
        (status = 204, description = "Villa replaced"),
        (status = 400, description = "Missing body, id mismatch or validation error"),
        (status = 404, description = "Villa not found")
    ),
    tag = "villas"
)]
pub async fn update_villa(
    State(service): State<Arc<VillaService>>,
    AppPath(id): AppPath<i32>,
    AppJson(dto): AppJson<Option<VillaUpdateDto>>,
) -> Result<StatusCode> {
    service.replace(id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Partially update a villa with a JSON Patch document
#[utoipa::path(
    patch,
    path = "/api/villas/{id}",
    params(
        ("id" = i32, Path, description = "Villa id")
    ),
    request_body(
        content = Vec<PatchOperation>,
        content_type = "application/json-patch+json"
    ),
    responses(
        (status = 204, description = "Villa patched"),
        (status = 400, description = "Missing document, id is 0, villa missing, patch or validation error")
    ),
    tag = "villas"
)]
pub async fn update_partial_villa(
    State(service): State<Arc<VillaService>>,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<Option<PatchDocument>>,
) -> Result<StatusCode> {
    service.patch(id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}
