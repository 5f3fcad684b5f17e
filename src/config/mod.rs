//! Site configuration management for `kiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [site], [build], [serve], [deploy]
//! ├── error          # ConfigError, ConfigDiagnostics
//! ├── handle         # ConfigHandle (atomic reload during watch)
//! └── mod.rs         # SiteConfig (this file)
//! ```

mod error;
mod handle;
pub mod section;

pub use error::{ConfigDiagnostics, ConfigError};
pub use handle::ConfigHandle;
pub use section::{BuildConfig, DeployConfig, ServeConfig, SiteInfo};

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{log, utils::path::normalize_path};

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site root: the directory holding the config file
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteInfo,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub minify: Option<bool>,
    pub drafts: Option<bool>,
    pub port: Option<u16>,
    pub interface: Option<std::net::IpAddr>,
}

impl SiteConfig {
    /// Find `config_name` upward from the working directory, then load it.
    pub fn discover(config_name: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let path = find_config_file(config_name)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_path_buf()))?;
        Self::load(&path, overrides)
    }

    /// Load, apply overrides and validate.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (mut config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.config_path = normalize_path(path);
        config.root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());
        log!("warn"; "unknown fields in {name} are ignored: {}", fields.join(", "));
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        Self::update_option(&mut self.build.output, overrides.output.as_ref());
        Self::update_option(&mut self.build.minify, overrides.minify.as_ref());
        Self::update_option(&mut self.build.drafts, overrides.drafts.as_ref());
        Self::update_option(&mut self.serve.port, overrides.port.as_ref());
        Self::update_option(&mut self.serve.interface, overrides.interface.as_ref());
    }

    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        self.site.validate(&mut diag);
        self.build.validate(&mut diag);
        diag.into_result()
    }

    /// Join a path with the site root.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.build.output)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root_join(&self.build.templates)
    }
}

/// Find the config file by walking up from the working directory.
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

/// Parse config with minimal required `[site]` fields.
/// Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SiteConfig {
    let config = format!("[site]\ntitle = \"Test\"\nurl = \"https://example.com\"\n{extra}");
    let (parsed, ignored) = SiteConfig::parse_with_ignored(&config).unwrap();
    assert!(ignored.is_empty(), "test config has unknown fields: {ignored:?}");
    parsed
}

/// Write a minimal `kiln.toml` into `root` and load it.
#[cfg(test)]
pub fn test_site_config(root: &Path, extra: &str) -> SiteConfig {
    let path = root.join(CONFIG_FILE);
    let content = format!("[site]\ntitle = \"Test\"\nurl = \"https://example.com\"\n{extra}");
    fs::write(&path, content).unwrap();
    SiteConfig::load(&path, &Overrides::default()).unwrap()
}
