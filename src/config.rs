use crate::errors::{ConfigError, StoreError};
use crate::storage::{FileStore, MemoryStore, SheetStore, TableStore};
use std::{env, path::PathBuf, sync::Arc};
use tokio::fs;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/records.json";
pub const DEFAULT_ADMIN_PASSWORD: &str = "coffee1234";

#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    File(PathBuf),
    Memory,
    Sheet { url: String, token: Option<String> },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub backend: Backend,
    pub admin_password: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let sheet_url = lookup("SHEET_URL").filter(|url| !url.trim().is_empty());
        let file = || {
            Backend::File(
                lookup("APP_DATA_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            )
        };
        let sheet = |url| Backend::Sheet {
            url,
            token: lookup("SHEET_TOKEN").filter(|token| !token.is_empty()),
        };

        let store = lookup("APP_STORE").map(|value| value.trim().to_ascii_lowercase());
        let backend = match store.as_deref() {
            None | Some("") => sheet_url.map_or_else(file, sheet),
            Some("file") => file(),
            Some("memory") => Backend::Memory,
            Some("sheet") => sheet(sheet_url.ok_or(ConfigError::MissingSheetUrl)?),
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let admin_password =
            lookup("ADMIN_PASSWORD").unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());

        Ok(Self {
            port,
            backend,
            admin_password,
        })
    }

    pub async fn open_store(&self) -> Result<Arc<dyn TableStore>, StoreError> {
        let store: Arc<dyn TableStore> = match &self.backend {
            Backend::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).await?;
                    }
                }
                Arc::new(FileStore::new(path.clone()))
            }
            Backend::Memory => Arc::new(MemoryStore::default()),
            Backend::Sheet { url, token } => Arc::new(SheetStore::new(url.clone(), token.clone())?),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    fn config_error(pairs: &[(&str, &str)]) -> ConfigError {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned()).unwrap_err()
    }

    #[test]
    fn defaults_to_file_backend() {
        let settings = settings_from(&[]);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.backend, Backend::File(PathBuf::from("data/records.json")));
        assert_eq!(settings.admin_password, DEFAULT_ADMIN_PASSWORD);
    }

    #[test]
    fn invalid_port_falls_back() {
        assert_eq!(settings_from(&[("PORT", "lots")]).port, 8080);
        assert_eq!(settings_from(&[("PORT", "9001")]).port, 9001);
    }

    #[test]
    fn sheet_url_selects_sheet_backend() {
        let settings = settings_from(&[("SHEET_URL", "https://sheets.example/t/1"), ("SHEET_TOKEN", "abc")]);
        assert_eq!(
            settings.backend,
            Backend::Sheet {
                url: "https://sheets.example/t/1".to_string(),
                token: Some("abc".to_string()),
            }
        );
    }

    #[test]
    fn explicit_store_wins_over_sheet_url() {
        let settings = settings_from(&[("APP_STORE", "memory"), ("SHEET_URL", "https://sheets.example")]);
        assert_eq!(settings.backend, Backend::Memory);

        let settings = settings_from(&[("APP_STORE", "file"), ("APP_DATA_PATH", "/tmp/x.json")]);
        assert_eq!(settings.backend, Backend::File(PathBuf::from("/tmp/x.json")));
    }

    #[test]
    fn sheet_store_without_url_is_an_error() {
        assert_eq!(config_error(&[("APP_STORE", "sheet")]), ConfigError::MissingSheetUrl);
        assert_eq!(
            config_error(&[("APP_STORE", "sheet"), ("SHEET_URL", "  ")]),
            ConfigError::MissingSheetUrl
        );

        let settings = settings_from(&[("APP_STORE", "sheet"), ("SHEET_URL", "https://sheets.example")]);
        assert!(matches!(settings.backend, Backend::Sheet { .. }));
    }

    #[test]
    fn unknown_store_is_an_error() {
        assert_eq!(
            config_error(&[("APP_STORE", "memroy")]),
            ConfigError::UnknownStore("memroy".to_string())
        );
        assert_eq!(settings_from(&[("APP_STORE", "Memory")]).backend, Backend::Memory);
    }
}
