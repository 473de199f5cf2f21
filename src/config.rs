//! Configuration module for the package catalog engine.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PKGDEX_` and use double underscores
//! to separate nested levels:
//! - `PKGDEX_INDEX__SHOW_UNEXPORTED=true` sets `index.show_unexported`
//! - `PKGDEX_SERVER__BIND=0.0.0.0:56789` sets `server.bind`
//! - `PKGDEX_PAGE__THEME=dark` sets `page.theme`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_DIR: &str = ".pkgdex";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Index build settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Page server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Page presentation settings
    #[serde(default)]
    pub page: PageConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct IndexConfig {
    /// List unexported declarations in listings
    #[serde(default = "default_false")]
    pub show_unexported: bool,

    /// Corpus document used when no path is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// Maximum number of rendered pages kept in memory
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Size in bytes of one content pool chunk
    #[serde(default = "default_content_chunk_size")]
    pub content_chunk_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PageConfig {
    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub source_reading_style: SourceReadingStyle,
}

/// How declarations link to their source.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceReadingStyle {
    Plain,
    #[default]
    Highlight,
    Rich,
    /// Link to the module repository instead of the built-in source view
    External,
}

/// Output-affecting options, keyed into the page cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PageOptions {
    pub theme: String,
    pub language: String,
    pub show_unexported: bool,
    pub source_reading_style: SourceReadingStyle,
}

fn default_version() -> u32 {
    1
}
fn default_false() -> bool {
    false
}
fn default_bind_address() -> String {
    "127.0.0.1:56789".to_string()
}
fn default_cache_max_entries() -> usize {
    4096
}
fn default_content_chunk_size() -> usize {
    crate::server::pool::DEFAULT_CHUNK_SIZE
}
fn default_theme() -> String {
    "light".to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            index: IndexConfig::default(),
            server: ServerConfig::default(),
            page: PageConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            cache_max_entries: default_cache_max_entries(),
            content_chunk_size: default_content_chunk_size(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            language: default_language(),
            source_reading_style: SourceReadingStyle::default(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring the environment
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels
            .merge(Env::prefixed("PKGDEX_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the workspace config by looking for a .pkgdex directory
    /// from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Options that change rendered output
    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            theme: self.page.theme.clone(),
            language: self.page.language.clone(),
            show_unexported: self.index.show_unexported,
            source_reading_style: self.page.source_reading_style,
        }
    }

    /// Save current configuration to file
    pub fn save(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Self::init_config_file_at(PathBuf::from(CONFIG_DIR).join("settings.toml"), force)
    }

    pub fn init_config_file_at(
        config_path: PathBuf,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = format!(
            r#"# pkgdex configuration file

# Version of the configuration schema
version = 1

# Global debug mode
debug = false

[index]
# List unexported declarations on package pages
show_unexported = false

# Corpus document produced by the front-end parser
# corpus_path = "corpus.json"

[server]
# HTTP server bind address
bind = "{bind}"

# Maximum number of rendered pages kept in memory
cache_max_entries = {cache}

# Size in bytes of one content pool chunk
content_chunk_size = {chunk}

[page]
theme = "light"
language = "en-US"

# One of "plain", "highlight", "rich", "external"
source_reading_style = "highlight"
"#,
            bind = default_bind_address(),
            cache = default_cache_max_entries(),
            chunk = default_content_chunk_size(),
        );

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
