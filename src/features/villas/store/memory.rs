use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::error::{AppError, Result};
use crate::features::villas::models::Villa;
use crate::features::villas::store::VillaStore;

/// Ordered in-memory collection. Writers hold the lock for the whole
/// check-and-mutate sequence.
#[derive(Debug, Default)]
pub struct InMemoryVillaStore {
    villas: RwLock<Vec<Villa>>,
}

fn next_id_of(villas: &[Villa]) -> i32 {
    villas.iter().map(|v| v.id).max().map_or(1, |max| max + 1)
}

impl InMemoryVillaStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_villas(villas: Vec<Villa>) -> Self {
        Self {
            villas: RwLock::new(villas),
        }
    }
}

#[async_trait]
impl VillaStore for InMemoryVillaStore {
    async fn list(&self) -> Result<Vec<Villa>> {
        Ok(self.villas.read().await.clone())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Villa>> {
        Ok(self
            .villas
            .read()
            .await
            .iter()
            .find(|v| v.id == id)
            .cloned())
    }

    async fn next_id(&self) -> Result<i32> {
        Ok(next_id_of(&self.villas.read().await))
    }

    #[tracing::instrument(skip(self, villa), fields(id = villa.id))]
    async fn insert(&self, villa: Villa) -> Result<Villa> {
        let mut villas = self.villas.write().await;
        if villas.iter().any(|v| v.id == villa.id) {
            return Err(AppError::Internal(format!(
                "Villa with id {} already exists",
                villa.id
            )));
        }
        villas.push(villa.clone());
        Ok(villa)
    }

    #[tracing::instrument(skip(self, villa), fields(name = %villa.name))]
    async fn create(&self, mut villa: Villa) -> Result<Villa> {
        let mut villas = self.villas.write().await;
        if villas.iter().any(|v| v.has_name(&villa.name)) {
            return Err(AppError::DuplicateName(villa.name));
        }

        let now = Utc::now();
        villa.id = next_id_of(&villas);
        villa.created_at = now;
        villa.updated_at = now;
        villas.push(villa.clone());
        Ok(villa)
    }

    #[tracing::instrument(skip(self, villa), fields(id = villa.id))]
    async fn update(&self, villa: &Villa) -> Result<bool> {
        let mut villas = self.villas.write().await;
        let Some(existing) = villas.iter_mut().find(|v| v.id == villa.id) else {
            return Ok(false);
        };

        *existing = Villa {
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..villa.clone()
        };
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<bool> {
        let mut villas = self.villas.write().await;
        let before = villas.len();
        villas.retain(|v| v.id != id);
        Ok(villas.len() != before)
    }
}
