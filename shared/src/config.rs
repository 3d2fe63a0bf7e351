use std::env;

pub const DEFAULT_TABLE_NAME: &str = "fiscal-tracker";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Dynamo,
    Memory,
}

/// Settings read once at cold start
#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    pub storage: StorageBackend,
    pub catalog_path: Option<String>,
    pub dossiers_path: Option<String>,
    pub seed_users_path: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            storage: StorageBackend::Dynamo,
            catalog_path: None,
            dossiers_path: None,
            seed_users_path: None,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or empty values keep the defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let storage = match get("STORAGE_BACKEND").as_deref() {
            Some("memory") => StorageBackend::Memory,
            Some("dynamo") | None => StorageBackend::Dynamo,
            Some(other) => {
                tracing::warn!("Unknown STORAGE_BACKEND {:?}, using dynamo", other);
                StorageBackend::Dynamo
            }
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        Self {
            table_name: get("TABLE_NAME").unwrap_or(defaults.table_name),
            storage,
            catalog_path: get("CATALOG_PATH"),
            dossiers_path: get("DOSSIERS_PATH"),
            seed_users_path: get("SEED_USERS_PATH"),
            allowed_origins,
        }
    }

    /// Echo the request origin when allowed, otherwise the first allowed one
    pub fn cors_origin(&self, request_origin: Option<&str>) -> String {
        match request_origin {
            Some(origin) if self.allowed_origins.iter().any(|o| o == origin) => origin.to_string(),
            _ => self
                .allowed_origins
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
        }
    }
}
