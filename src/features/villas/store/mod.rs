//! Persistence seam for villas.
//!
//! `create` is the only way new ids are handed out at runtime: the name
//! check, `next_id` and the insert run as one atomic unit so concurrent
//! creates never collide. `insert` takes a caller-assigned id and is used for
//! seeding.

mod memory;
mod postgres;

pub use memory::InMemoryVillaStore;
pub use postgres::PgVillaStore;

use async_trait::async_trait;
use validator::Validate;

use crate::core::error::Result;
use crate::features::villas::mapper;
use crate::features::villas::models::Villa;

#[async_trait]
pub trait VillaStore: Send + Sync {
    /// All villas, in whatever order the backend yields them
    async fn list(&self) -> Result<Vec<Villa>>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Villa>>;

    /// `max(id) + 1`, or 1 when the store is empty
    async fn next_id(&self) -> Result<i32>;

    /// Persist a villa whose id is already assigned
    async fn insert(&self, villa: Villa) -> Result<Villa>;

    /// Assign the next id and persist, failing with `DuplicateName` when a
    /// villa with the same name (case-insensitive) exists
    async fn create(&self, villa: Villa) -> Result<Villa>;

    /// Overwrite every field of the villa with the same id. Returns `false`
    /// when no such villa exists.
    async fn update(&self, villa: &Villa) -> Result<bool>;

    /// Returns `false` when no such villa exists
    async fn delete(&self, id: i32) -> Result<bool>;
}

/// The two villas the service shipped with before it had a database
pub fn sample_villas() -> Vec<Villa> {
    vec![
        Villa {
            name: "Pool View".to_string(),
            sqm: 100,
            occupancy: 4,
            ..Villa::default()
        },
        Villa {
            name: "Another View".to_string(),
            sqm: 200,
            occupancy: 6,
            ..Villa::default()
        },
    ]
}

/// Insert the sample villas if the store is empty. Samples are checked with
/// the same rules as create requests. Returns how many were added.
pub async fn seed_sample_villas(store: &dyn VillaStore) -> Result<usize> {
    if !store.list().await?.is_empty() {
        tracing::info!("Villa store already populated, skipping sample seed");
        return Ok(0);
    }

    let samples = sample_villas();
    let count = samples.len();
    for mut villa in samples {
        mapper::entity_to_create_view(&villa).validate()?;
        villa.id = store.next_id().await?;
        let villa = store.insert(villa).await?;
        tracing::info!("Seeded villa {} ({})", villa.id, villa.name);
    }
    Ok(count)
}
