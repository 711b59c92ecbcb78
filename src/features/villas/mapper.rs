//! Field-by-field translation between the `Villa` entity and its views.
//!
//! Fields a view does not carry take their defaults: `id` is 0 for a
//! created villa until the store assigns one, timestamps are stamped by the
//! store.

use crate::features::villas::dtos::{VillaCreateDto, VillaDto, VillaUpdateDto};
use crate::features::villas::models::Villa;

pub fn entity_to_create_view(villa: &Villa) -> VillaCreateDto {
    VillaCreateDto {
        name: villa.name.clone(),
        details: villa.details.clone(),
        rate: villa.rate,
        sqm: villa.sqm,
        occupancy: villa.occupancy,
        image_url: villa.image_url.clone(),
        amenity: villa.amenity.clone(),
    }
}

pub fn create_view_to_entity(dto: VillaCreateDto) -> Villa {
    Villa {
        name: dto.name,
        details: dto.details,
        rate: dto.rate,
        sqm: dto.sqm,
        occupancy: dto.occupancy,
        image_url: dto.image_url,
        amenity: dto.amenity,
        ..Villa::default()
    }
}

pub fn entity_to_update_view(villa: &Villa) -> VillaUpdateDto {
    VillaUpdateDto {
        id: villa.id,
        name: villa.name.clone(),
        details: villa.details.clone(),
        rate: villa.rate,
        sqm: villa.sqm,
        occupancy: villa.occupancy,
        image_url: villa.image_url.clone(),
        amenity: villa.amenity.clone(),
    }
}

pub fn update_view_to_entity(dto: VillaUpdateDto) -> Villa {
    Villa {
        id: dto.id,
        name: dto.name,
        details: dto.details,
        rate: dto.rate,
        sqm: dto.sqm,
        occupancy: dto.occupancy,
        image_url: dto.image_url,
        amenity: dto.amenity,
        ..Villa::default()
    }
}

pub fn entity_to_read_view(villa: &Villa) -> VillaDto {
    VillaDto {
        id: villa.id,
        name: villa.name.clone(),
        details: villa.details.clone(),
        rate: villa.rate,
        sqm: villa.sqm,
        occupancy: villa.occupancy,
        image_url: villa.image_url.clone(),
        amenity: villa.amenity.clone(),
    }
}

impl From<Villa> for VillaDto {
    fn from(villa: Villa) -> Self {
        entity_to_read_view(&villa)
    }
}
