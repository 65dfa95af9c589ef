use crate::config::StorageBackend;
use crate::workspace::Workspace;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub storage: StorageBackend,
    pub workspace: Option<Workspace>,
}

impl AppState {
    pub fn new(storage: StorageBackend) -> Self {
        Self {
            storage,
            workspace: None,
        }
    }
}
