use std::sync::Arc;

use crate::store::{AccountDirectory, CatalogStore, MemStore, OrderLedger, PgStore};

/// Shared handles to the three data-owning components. Handlers only ever
/// see the trait objects, so the Postgres and in-memory backends are
/// interchangeable.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountDirectory>,
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderLedger>,
}

impl AppState {
    pub fn memory() -> Self {
        let store = Arc::new(MemStore::new());
        Self {
            accounts: store.clone(),
            catalog: store.clone(),
            orders: store,
        }
    }

    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            accounts: store.clone(),
            catalog: store.clone(),
            orders: store,
        }
    }
}
