use crate::client::ResolvedClientConfig;
use crate::storage::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub api_key: Arc<str>,
    pub client: Arc<ResolvedClientConfig>,
}

impl AppState {
    pub fn new(store: Store, api_key: impl Into<Arc<str>>, client: ResolvedClientConfig) -> Self {
        Self {
            store,
            api_key: api_key.into(),
            client: Arc::new(client),
        }
    }
}
