use std::sync::Arc;

use axum_test::TestServer;

use crate::features::villas::store::{seed_sample_villas, InMemoryVillaStore, VillaStore};
use crate::features::villas::{routes, VillaService};

fn server_for(store: Arc<dyn VillaStore>) -> TestServer {
    let service = Arc::new(VillaService::new(store));
    TestServer::new(routes::routes(service)).expect("failed to build test server")
}

/// Villa routes over an empty in-memory store
pub fn test_server() -> TestServer {
    server_for(Arc::new(InMemoryVillaStore::new()))
}

/// Villa routes over an in-memory store holding "Pool View" (id 1) and
/// "Another View" (id 2)
pub async fn seeded_server() -> TestServer {
    let store = Arc::new(InMemoryVillaStore::new());
    seed_sample_villas(store.as_ref())
        .await
        .expect("failed to seed villas");
    server_for(store)
}
