use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

const DATABASE_URL_ENV: &str = "KITSU_IMPORT_DATABASE_URL";
const PAGES_ENV: &str = "KITSU_IMPORT_PAGES";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub database: DatabaseConfig,

    pub kitsu: KitsuConfig,

    pub import: ImportConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,

    pub connect_timeout_seconds: u64,

    /// Create missing tables from the entity definitions before importing.
    /// Meant for local development databases; production schemas are
    /// provisioned ahead of time.
    pub create_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://kitsu_development@localhost:5432/kitsu_development".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_seconds: 10,
            create_schema: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KitsuConfig {
    pub graphql_url: String,

    /// Anime nodes requested per page.
    pub page_size: u32,

    /// Characters requested per anime node.
    pub character_limit: u32,

    /// Category references requested per anime node.
    pub category_page_size: u32,

    /// Size of the one-shot category query.
    pub category_limit: u32,

    /// Prefix stripped from image URLs to form the stored image id.
    pub storage_prefix: String,

    pub request_timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for KitsuConfig {
    fn default() -> Self {
        Self {
            graphql_url: "https://kitsu.io/api/graphql".to_string(),
            page_size: 20,
            character_limit: 1000,
            category_page_size: 100,
            category_limit: 243,
            storage_prefix: "https://media.kitsu.io/".to_string(),
            request_timeout_seconds: 30,
            user_agent: "kitsu-import/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Number of anime pages fetched per run.
    pub pages: u32,

    pub import_categories: bool,

    /// Role label written to every casting row.
    pub casting_role: String,

    pub casting_language: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            pages: 3,
            import_categories: true,
            casting_role: "Producer".to_string(),
            casting_language: "En".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = HashMap::new();
        labels.insert("app".to_string(), "kitsu-import".to_string());

        Self {
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        dotenvy::dotenv().ok();

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            self.database.url = url;
        }

        if let Ok(pages) = std::env::var(PAGES_ENV) {
            self.import.pages = pages
                .parse()
                .with_context(|| format!("{PAGES_ENV} must be a positive integer"))?;
        }

        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    /// Writes a default config to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        Self::default().save_to_path(path)?;
        Ok(true)
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("kitsu-import").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".kitsu-import").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.kitsu.graphql_url.is_empty() {
            anyhow::bail!("Kitsu GraphQL URL cannot be empty");
        }

        if self.kitsu.page_size == 0 {
            anyhow::bail!("Kitsu page size must be > 0");
        }

        if self.import.pages == 0 {
            anyhow::bail!("Import page count must be > 0");
        }

        if self.database.max_connections < self.database.min_connections {
            anyhow::bail!("Database max_connections must be >= min_connections");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.kitsu.page_size, 20);
        assert_eq!(config.kitsu.storage_prefix.len(), 23);
        assert_eq!(config.import.pages, 3);
        assert!(!config.database.create_schema);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[kitsu]"));
        assert!(toml_str.contains("[import]"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [import]
            pages = 7

            [kitsu]
            page_size = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.import.pages, 7);
        assert_eq!(config.kitsu.page_size, 5);
        assert_eq!(config.import.casting_role, "Producer");
        assert_eq!(config.kitsu.category_limit, 243);
    }

    #[test]
    fn test_default_file_is_written_once() {
        let path = std::env::temp_dir()
            .join(format!("kitsu-import-config-{}", std::process::id()))
            .join("config.toml");

        assert!(Config::create_default_if_missing(&path).unwrap());
        assert!(!Config::create_default_if_missing(&path).unwrap());

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.kitsu.graphql_url, "https://kitsu.io/api/graphql");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_validate_rejects_zero_pages() {
        let mut config = Config::default();
        config.import.pages = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.kitsu.page_size = 0;
        assert!(config.validate().is_err());
    }
}
