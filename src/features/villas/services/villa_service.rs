use std::sync::Arc;

use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::villas::dtos::{VillaCreateDto, VillaDto, VillaUpdateDto};
use crate::features::villas::mapper;
use crate::features::villas::store::VillaStore;
use crate::shared::patch::PatchDocument;

/// Villa resource operations over an injected store
pub struct VillaService {
    store: Arc<dyn VillaStore>,
}

impl std::fmt::Debug for VillaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VillaService")
            .field("store", &"<dyn VillaStore>")
            .finish()
    }
}

fn reject_zero_id(id: i32) -> Result<()> {
    if id == 0 {
        return Err(AppError::BadRequest("Villa id must not be 0".to_string()));
    }
    Ok(())
}

impl VillaService {
    pub fn new(store: Arc<dyn VillaStore>) -> Self {
        Self { store }
    }

    /// List all villas
    pub async fn list(&self) -> Result<Vec<VillaDto>> {
        let villas = self.store.list().await?;
        Ok(villas.iter().map(mapper::entity_to_read_view).collect())
    }

    /// Get a villa by id
    pub async fn get_by_id(&self, id: i32) -> Result<VillaDto> {
        if id == 0 {
            tracing::error!("Get villa error with id: {}", id);
            return Err(AppError::BadRequest("Villa id must not be 0".to_string()));
        }

        self.store
            .get_by_id(id)
            .await?
            .map(VillaDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Villa with id {} not found", id)))
    }

    /// Create a villa; the store assigns the id
    pub async fn create(&self, dto: Option<VillaCreateDto>) -> Result<VillaDto> {
        let dto = dto.ok_or_else(|| AppError::BadRequest("Villa body is required".to_string()))?;
        dto.validate()?;

        let villa = self.store.create(mapper::create_view_to_entity(dto)).await?;
        tracing::info!("Created villa {} ({})", villa.id, villa.name);

        Ok(VillaDto::from(villa))
    }

    /// Delete a villa by id
    pub async fn delete(&self, id: i32) -> Result<()> {
        reject_zero_id(id)?;

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Villa with id {} not found", id)));
        }

        tracing::info!("Deleted villa {}", id);
        Ok(())
    }

    /// Replace every field of an existing villa
    pub async fn replace(&self, id: i32, dto: Option<VillaUpdateDto>) -> Result<()> {
        let dto = dto.ok_or_else(|| AppError::BadRequest("Villa body is required".to_string()))?;
        if dto.id != id {
            return Err(AppError::BadRequest(format!(
                "Body id {} does not match path id {}",
                dto.id, id
            )));
        }
        dto.validate()?;

        let villa = mapper::update_view_to_entity(dto);
        if !self.store.update(&villa).await? {
            return Err(AppError::NotFound(format!("Villa with id {} not found", id)));
        }

        tracing::info!("Replaced villa {}", id);
        Ok(())
    }

    /// Apply a patch document to a villa's update view, validate, then persist
    pub async fn patch(&self, id: i32, patch: Option<PatchDocument>) -> Result<()> {
        let patch =
            patch.ok_or_else(|| AppError::BadRequest("Patch document is required".to_string()))?;
        reject_zero_id(id)?;

        let villa = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Villa with id {} does not exist", id)))?;

        let patched: VillaUpdateDto = patch.apply_to(&mapper::entity_to_update_view(&villa))?;
        if patched.id != id {
            return Err(AppError::ValidationFailed(vec![format!(
                "id: cannot be changed from {} to {}",
                id, patched.id
            )]));
        }
        patched.validate()?;

        if !self.store.update(&mapper::update_view_to_entity(patched)).await? {
            // Deleted between load and commit
            return Err(AppError::BadRequest(format!(
                "Villa with id {} does not exist",
                id
            )));
        }

        let applied: Vec<String> = patch
            .operations()
            .iter()
            .map(|op| format!("{} {}", op.name(), op.path()))
            .collect();
        tracing::info!("Patched villa {} [{}]", id, applied.join(", "));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::villas::store::InMemoryVillaStore;
    use crate::shared::patch::PatchError;
    use fake::{faker::company::en::CompanyName, Fake};
    use serde_json::json;
    use std::collections::HashSet;

    fn service() -> VillaService {
        VillaService::new(Arc::new(InMemoryVillaStore::new()))
    }

    fn create_dto(name: &str, sqm: i32, occupancy: i32) -> VillaCreateDto {
        VillaCreateDto {
            name: name.to_string(),
            details: None,
            rate: 0.0,
            sqm,
            occupancy,
            image_url: None,
            amenity: None,
        }
    }

    fn patch(ops: serde_json::Value) -> Option<PatchDocument> {
        Some(serde_json::from_value(ops).unwrap())
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_fields() {
        let service = service();
        let created = service
            .create(Some(create_dto("Pool View", 100, 4)))
            .await
            .unwrap();
        assert_eq!(created.id, 1);

        let fetched = service.get_by_id(1).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.sqm, 100);
        assert_eq!(fetched.occupancy, 4);
    }

    #[tokio::test]
    async fn test_sequential_creates_assign_one_to_n() {
        let service = service();
        for i in 1..=5 {
            let created = service
                .create(Some(create_dto(&format!("Villa {}", i), 50, 2)))
                .await
                .unwrap();
            assert_eq!(created.id, i);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_never_share_an_id() {
        let service = Arc::new(service());
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let service = Arc::clone(&service);
                let name = format!("{} {}", CompanyName().fake::<String>(), i);
                tokio::spawn(async move { service.create(Some(create_dto(&name, 80, 3))).await })
            })
            .collect();

        let results = futures::future::join_all(handles).await;
        let ids: HashSet<i32> = results
            .into_iter()
            .map(|r| r.unwrap().unwrap().id)
            .collect();

        assert_eq!(ids.len(), 64);
        assert_eq!(ids, (1..=64).collect::<HashSet<i32>>());
    }

    #[tokio::test]
    async fn test_create_missing_body_is_bad_request() {
        let err = service().create(None).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_duplicate_name_mutates_nothing() {
        let service = service();
        service.create(Some(create_dto("Pool View", 100, 4))).await.unwrap();
        service.create(Some(create_dto("Another View", 200, 6))).await.unwrap();

        let err = service
            .create(Some(create_dto("pool view", 10, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(_)));
        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_invalid_fields_fail_validation() {
        let err = service()
            .create(Some(create_dto("", -5, 2)))
            .await
            .unwrap_err();
        match err {
            AppError::ValidationFailed(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_accepts_long_name() {
        let name = "V".repeat(201);
        let created = service()
            .create(Some(create_dto(&name, 10, 2)))
            .await
            .unwrap();
        assert_eq!(created.name.len(), 201);
    }

    #[tokio::test]
    async fn test_get_zero_is_bad_request_regardless_of_contents() {
        let service = service();
        assert!(matches!(
            service.get_by_id(0).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
        service.create(Some(create_dto("Pool View", 100, 4))).await.unwrap();
        assert!(matches!(
            service.get_by_id(0).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service();
        service.create(Some(create_dto("Pool View", 100, 4))).await.unwrap();
        service.delete(1).await.unwrap();
        assert!(matches!(
            service.get_by_id(1).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.delete(1).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.delete(0).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_replace_id_mismatch_mutates_nothing() {
        let service = service();
        let created = service
            .create(Some(create_dto("Pool View", 100, 4)))
            .await
            .unwrap();

        let dto = VillaUpdateDto {
            id: 2,
            name: "Changed".to_string(),
            details: None,
            rate: 1.0,
            sqm: 1,
            occupancy: 1,
            image_url: None,
            amenity: None,
        };
        let err = service.replace(1, Some(dto)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(service.get_by_id(1).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_replace_is_full_overwrite() {
        let service = service();
        let mut dto = create_dto("Pool View", 100, 4);
        dto.details = Some("Sea side".to_string());
        dto.amenity = Some("Pool".to_string());
        service.create(Some(dto)).await.unwrap();

        let replacement = VillaUpdateDto {
            id: 1,
            name: "Pool View".to_string(),
            details: None,
            rate: 120.0,
            sqm: 110,
            occupancy: 5,
            image_url: None,
            amenity: None,
        };
        service.replace(1, Some(replacement)).await.unwrap();

        let villa = service.get_by_id(1).await.unwrap();
        assert_eq!(villa.details, None);
        assert_eq!(villa.amenity, None);
        assert_eq!(villa.rate, 120.0);
        assert_eq!(villa.sqm, 110);
    }

    #[tokio::test]
    async fn test_replace_missing_villa_is_not_found() {
        let dto = VillaUpdateDto {
            id: 9,
            name: "Ghost".to_string(),
            details: None,
            rate: 0.0,
            sqm: 0,
            occupancy: 0,
            image_url: None,
            amenity: None,
        };
        let err = service().replace(9, Some(dto)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_patch_replaces_single_field() {
        let service = service();
        let created = service
            .create(Some(create_dto("Pool View", 100, 4)))
            .await
            .unwrap();

        service
            .patch(
                1,
                patch(json!([{"op": "replace", "path": "/occupancy", "value": 6}])),
            )
            .await
            .unwrap();

        let villa = service.get_by_id(1).await.unwrap();
        assert_eq!(villa.occupancy, 6);
        assert_eq!(villa.name, created.name);
        assert_eq!(villa.sqm, created.sqm);
    }

    #[tokio::test]
    async fn test_patch_rejects_missing_document_zero_id_and_missing_villa() {
        let service = service();
        assert!(matches!(
            service.patch(1, None).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            service.patch(0, Some(PatchDocument::default())).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            service.patch(3, Some(PatchDocument::default())).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_patch_unknown_path_is_structural_error() {
        let service = service();
        service.create(Some(create_dto("Pool View", 100, 4))).await.unwrap();

        let err = service
            .patch(1, patch(json!([{"op": "replace", "path": "/floors", "value": 2}])))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Patch(PatchError::PathNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_patch_failed_test_op_leaves_villa_unchanged() {
        let service = service();
        let created = service
            .create(Some(create_dto("Pool View", 100, 4)))
            .await
            .unwrap();

        let err = service
            .patch(
                1,
                patch(json!([
                    {"op": "replace", "path": "/occupancy", "value": 9},
                    {"op": "test", "path": "/sqm", "value": 999}
                ])),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Patch(PatchError::TestFailed { .. })));
        assert_eq!(service.get_by_id(1).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_patch_invalid_result_is_not_committed() {
        let service = service();
        let created = service
            .create(Some(create_dto("Pool View", 100, 4)))
            .await
            .unwrap();

        let err = service
            .patch(1, patch(json!([{"op": "remove", "path": "/name"}])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));

        let err = service
            .patch(
                1,
                patch(json!([{"op": "replace", "path": "/occupancy", "value": -3}])),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));

        let err = service
            .patch(
                1,
                patch(json!([{"op": "replace", "path": "/sqm", "value": "big"}])),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));

        assert_eq!(service.get_by_id(1).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_patch_cannot_change_id() {
        let service = service();
        service.create(Some(create_dto("Pool View", 100, 4))).await.unwrap();

        let err = service
            .patch(1, patch(json!([{"op": "replace", "path": "/id", "value": 5}])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
        assert!(service.get_by_id(5).await.is_err());
    }
}
