use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Treat an explicit `null` like a missing field so cleared values fall back
/// to their defaults instead of failing to decode.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

// Create request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VillaCreateDto {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    pub details: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub rate: f64,

    /// Floor area in square metres
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub sqm: i32,

    /// Maximum number of guests
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub occupancy: i32,

    pub image_url: Option<String>,

    pub amenity: Option<String>,
}

// Full replacement request, also the shape patch documents are applied to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VillaUpdateDto {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i32,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    pub details: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub rate: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub sqm: i32,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub occupancy: i32,

    pub image_url: Option<String>,

    pub amenity: Option<String>,
}

// Response DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VillaDto {
    pub id: i32,
    pub name: String,
    pub details: Option<String>,
    pub rate: f64,
    pub sqm: i32,
    pub occupancy: i32,
    pub image_url: Option<String>,
    pub amenity: Option<String>,
}
