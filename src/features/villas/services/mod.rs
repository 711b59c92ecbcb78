pub mod villa_service;

pub use villa_service::VillaService;
