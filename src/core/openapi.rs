use utoipa::{Modify, OpenApi};

use crate::core::config::SwaggerConfig;
use crate::features::villas::{dtos as villas_dtos, handlers as villas_handlers};
use crate::shared::patch::PatchOperation;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        villas_handlers::list_villas,
        villas_handlers::get_villa,
        villas_handlers::create_villa,
        villas_handlers::update_villa,
        villas_handlers::update_partial_villa,
        villas_handlers::delete_villa,
    ),
    components(
        schemas(
            // Shared
            Meta,
            PatchOperation,
            // Villas
            villas_dtos::VillaCreateDto,
            villas_dtos::VillaUpdateDto,
            villas_dtos::VillaDto,
            ApiResponse<villas_dtos::VillaDto>,
            ApiResponse<Vec<villas_dtos::VillaDto>>,
        )
    ),
    tags(
        (name = "villas", description = "Villa catalogue"),
    ),
    info(
        title = "Villa API",
        version = "0.1.0",
        description = "API documentation for the villa catalogue",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl From<&SwaggerConfig> for SwaggerInfoModifier {
    fn from(config: &SwaggerConfig) -> Self {
        Self {
            title: config.title.clone(),
            version: config.version.clone(),
            description: config.description.clone(),
        }
    }
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

/// OpenAPI document with the configured title, version and description
pub fn build_openapi(config: &SwaggerConfig) -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier::from(config).modify(&mut openapi);
    openapi
}
