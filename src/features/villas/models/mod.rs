pub mod villa;

pub use villa::{name_key, Villa};
