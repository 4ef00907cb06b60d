//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/projsync/projsync.toml`
//! 3. Project config: `--config <file>` or `./projsync.toml` (TOML or YAML, by extension)
//! 4. Environment variables: `PROJSYNC_*` prefix, `__` between sections
//!    (e.g. `PROJSYNC_TARGET__PAT_VALUE`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::AmbiguityPolicy;
use crate::application::ApplicationError;
use crate::domain::OrphanPolicy;

/// Project config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "projsync.toml";

/// Connection settings for one server site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// e.g. `https://tableau.example.com`
    pub server_url: String,
    /// Site content url, empty for the default site
    pub site_name: String,
    /// REST API version
    pub api_version: String,
    /// Personal access token name
    pub pat_name: String,
    /// Personal access token secret
    pub pat_value: String,
    /// Verify the server's TLS certificate
    pub verify_tls: bool,
    /// Projects per page when listing
    pub page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            site_name: String::new(),
            api_version: "3.19".into(),
            pat_name: String::new(),
            pat_value: String::new(),
            verify_tls: true,
            page_size: 100,
        }
    }
}

impl ServerConfig {
    /// Check that everything needed to sign in is set.
    pub fn validate(&self, role: &str) -> Result<(), ApplicationError> {
        let missing: Vec<&str> = [
            ("server_url", &self.server_url),
            ("pat_name", &self.pat_name),
            ("pat_value", &self.pat_value),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| *key)
        .collect();

        if !missing.is_empty() {
            return Err(ApplicationError::Config {
                message: format!("[{}] missing {}", role, missing.join(", ")),
            });
        }
        if self.page_size == 0 {
            return Err(ApplicationError::Config {
                message: format!("[{}] page_size must be positive", role),
            });
        }
        Ok(())
    }

    fn masked(&self) -> Self {
        let mut masked = self.clone();
        if !masked.pat_value.is_empty() {
            masked.pat_value = "********".into();
        }
        masked
    }
}

/// Snapshot file locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilesConfig {
    /// Raw source listing
    pub source_projects: PathBuf,
    /// Scoped forest to replicate
    pub cleaned_projects: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            source_projects: PathBuf::from("source_projects.json"),
            cleaned_projects: PathBuf::from("cleaned_projects.json"),
        }
    }
}

/// Hierarchy and replication policies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Source project id to re-root the hierarchy at
    pub top_level_project_id: Option<String>,
    /// Records whose parent is missing from the listing
    pub orphans: OrphanPolicy,
    /// Several same-named projects found after a conflict
    pub ambiguity: AmbiguityPolicy,
    /// Only reuse existing projects under the requested parent
    pub match_parent: bool,
    /// Ask the target to publish sample content into new projects
    pub publish_samples: bool,
}

/// Unified configuration for projsync.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub source: ServerConfig,
    pub target: ServerConfig,
    pub files: FilesConfig,
    pub sync: SyncConfig,
}

/// Get the XDG config directory for projsync.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "projsync").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("projsync.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Project config; required to exist when given,
    ///   otherwise `./projsync.toml` is used if present
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut builder = Config::builder()
            .add_source(Config::try_from(&Settings::default()).map_err(config_err)?);

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        // 3. Project config
        builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false)),
        };

        // 4. Environment variables
        builder = builder.add_source(
            Environment::with_prefix("PROJSYNC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        // Expand ~ and $VAR in path-like fields
        settings.expand_paths();

        Ok(settings)
    }

    /// Expand shell variables and tilde in snapshot paths.
    fn expand_paths(&mut self) {
        self.files.source_projects = expand_path(&self.files.source_projects);
        self.files.cleaned_projects = expand_path(&self.files.cleaned_projects);
    }

    /// Show the effective configuration as TOML, token secrets masked.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        let masked = Self {
            source: self.source.masked(),
            target: self.target.masked(),
            ..self.clone()
        };
        toml::to_string_pretty(&masked).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# projsync configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/projsync/projsync.toml
#   Project: ./projsync.toml or --config <file> (.toml or .yml)
#   Env:     PROJSYNC_* environment variables, e.g. PROJSYNC_TARGET__PAT_VALUE

[source]
server_url = "https://source.example.com"
site_name = ""
# api_version = "3.19"
pat_name = ""
pat_value = ""
# verify_tls = true
# page_size = 100

[target]
server_url = "https://target.example.com"
site_name = ""
pat_name = ""
pat_value = ""

[files]
# source_projects = "source_projects.json"
# cleaned_projects = "cleaned_projects.json"

[sync]
# Copy only this source project and its descendants
# top_level_project_id = ""

# Records whose parent is not in the listing: "drop" or "reject"
# orphans = "drop"

# Several same-named projects exist on the target: "first" or "reject"
# ambiguity = "first"

# Only reuse an existing project if it sits under the expected parent
# match_parent = false

# publish_samples = false
"#
        .to_string()
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
