//! Villa catalogue resource.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Success | Description |
//! |--------|----------|---------|-------------|
//! | GET | `/api/villas` | 200 | List villas |
//! | GET | `/api/villas/{id}` | 200 | Get a villa |
//! | POST | `/api/villas` | 201 | Create a villa |
//! | PUT | `/api/villas/{id}` | 204 | Replace a villa |
//! | PATCH | `/api/villas/{id}` | 204 | Apply a JSON Patch document |
//! | DELETE | `/api/villas/{id}` | 204 | Delete a villa |

pub mod dtos;
pub mod handlers;
pub mod mapper;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::VillaService;
