use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Tables the REST backend is willing to serve. Mirrors the server-side
/// whitelist so a typo fails here instead of as an opaque 400.
pub const ALLOWED_TABLES: &[&str] = &["investments", "investments_fake"];

fn default_table() -> String {
    "investments".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_table")]
    pub table: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    /// Home currency, used for records stored without one.
    pub currency: String,
    /// Names excluded from the usable-cash subtotal, matched exactly and
    /// case-sensitively against stored investment names.
    #[serde(default)]
    pub excluded_names: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "folio", "folio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !ALLOWED_TABLES.contains(&self.api.table.as_str()) {
            bail!(
                "Table {:?} is not served by the API (allowed: {})",
                self.api.table,
                ALLOWED_TABLES.join(", ")
            );
        }
        if self.currency.is_empty() {
            bail!("Home currency must not be empty");
        }
        Ok(())
    }

    pub fn excluded_name_set(&self) -> HashSet<String> {
        self.excluded_names.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api:
  base_url: "http://localhost:5000"
  table: "investments_fake"
currency: "CHF"
excluded_names:
  - "VIAC - 3A"
  - "Pilier 2a"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        config.validate().expect("Config should be valid");
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.table, "investments_fake");
        assert_eq!(config.currency, "CHF");
        assert_eq!(
            config.excluded_names,
            vec!["VIAC - 3A".to_string(), "Pilier 2a".to_string()]
        );
        assert!(config.excluded_name_set().contains("VIAC - 3A"));
    }

    #[test]
    fn test_table_defaults_to_investments() {
        let yaml_str = r#"
api:
  base_url: "http://localhost:5000"
currency: "CHF"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.api.table, "investments");
        assert!(config.excluded_names.is_empty());
    }

    #[test]
    fn test_unknown_table_is_rejected() {
        let yaml_str = r#"
api:
  base_url: "http://localhost:5000"
  table: "users"
currency: "CHF"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not served"));
    }

    #[test]
    fn test_empty_currency_is_rejected() {
        let yaml_str = r#"
api:
  base_url: "http://localhost:5000"
currency: ""
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert!(config.validate().is_err());
    }
}
