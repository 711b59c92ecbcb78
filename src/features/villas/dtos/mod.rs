pub mod villa_dto;

pub use villa_dto::{VillaCreateDto, VillaDto, VillaUpdateDto};
