use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Files,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Files => "files",
            StorageBackend::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "" => Ok(StorageBackend::Sqlite),
            "files" | "file" => Ok(StorageBackend::Files),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub workspace: Option<PathBuf>,
    pub storage: StorageBackend,
    pub log_filter: String,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let storage = match get("SCHOOLADMIN_STORAGE") {
            Some(v) => v
                .parse::<StorageBackend>()
                .map_err(|e| format!("SCHOOLADMIN_STORAGE: {}", e))?,
            None => StorageBackend::default(),
        };
        Ok(Self {
            workspace: get("SCHOOLADMIN_WORKSPACE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            storage,
            log_filter: get("SCHOOLADMIN_LOG")
                .or_else(|| get("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),
        })
    }
}
