//! Configuration system for sqlqube.
//!
//! Supports TOML-based configuration of the alias alphabet and statement
//! layout.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aliases::{AliasAllocator, DEFAULT_LETTERS};
use crate::error::{Result, SqlqubeError};
use crate::query_builder::BuildOptions;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct QubeConfig {
    pub aliases: AliasConfig,
    pub query: QueryConfig,
}

/// Alias generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AliasConfig {
    /// Alphabet aliases are spelled with (default: 24 capital letters
    /// without `J` and `W`).
    pub letters: String,
}

/// Statement building configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Name of the view behind `QueryBuilder::build` (default: "Query").
    pub default_view_name: String,
    /// Put each clause on its own line (default: false).
    pub multiline: bool,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            letters: DEFAULT_LETTERS.to_string(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        let options = BuildOptions::default();
        Self {
            default_view_name: options.default_view_name,
            multiline: options.multiline,
        }
    }
}

impl QubeConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SqlqubeError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| SqlqubeError::Config(format!("failed to parse config: {e}")))
    }

    /// Load from default locations (env var, cwd, user config dir, or defaults).
    ///
    /// Search order:
    /// 1. `SQLQUBE_CONFIG` environment variable
    /// 2. `./sqlqube.toml` (current directory)
    /// 3. `~/.config/sqlqube/config.toml` (user config dir)
    /// 4. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var("SQLQUBE_CONFIG") {
            if let Ok(cfg) = Self::from_file(&path) {
                tracing::info!(path = %path, "loaded config from SQLQUBE_CONFIG");
                return cfg;
            }
        }

        if let Ok(cfg) = Self::from_file("sqlqube.toml") {
            tracing::info!("loaded config from ./sqlqube.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("sqlqube").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }

    /// A fresh allocator over the configured alphabet.
    pub fn alias_allocator(&self) -> Result<AliasAllocator> {
        AliasAllocator::with_letters(&self.aliases.letters)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            default_view_name: self.query.default_view_name.clone(),
            multiline: self.query.multiline,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = QubeConfig::default();
        assert_eq!(cfg.aliases.letters, DEFAULT_LETTERS);
        assert_eq!(cfg.query.default_view_name, "Query");
        assert!(!cfg.query.multiline);
        assert_eq!(cfg.build_options(), BuildOptions::default());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[aliases]
letters = "PQR"

[query]
multiline = true
"#;
        let cfg = QubeConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.aliases.letters, "PQR");
        assert!(cfg.query.multiline);
        assert_eq!(cfg.query.default_view_name, "Query");

        let aliases = cfg.alias_allocator().unwrap();
        assert_eq!(aliases.next(), "P");
        assert_eq!(aliases.next(), "Q");
        assert_eq!(aliases.next(), "R");
        assert_eq!(aliases.next(), "PP");
    }

    #[test]
    fn test_invalid_alphabet() {
        let cfg = QubeConfig::from_toml("[aliases]\nletters = \"\"\n").unwrap();
        assert!(matches!(
            cfg.alias_allocator(),
            Err(SqlqubeError::Config(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = QubeConfig::from_toml("[query]\nmultiline = \"yes\"\n").unwrap_err();
        assert!(matches!(err, SqlqubeError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[query]\ndefault_view_name = \"Report\"").unwrap();
        let cfg = QubeConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.build_options().default_view_name, "Report");
        assert!(QubeConfig::from_file(file.path().with_extension("missing")).is_err());
    }
}
