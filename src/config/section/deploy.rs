//! `[deploy]` section configuration.
//!
//! ```toml
//! [deploy.rsync]
//! host = "deploy@example.com"
//! dest = "/usr/share/nginx/www"
//! args = ["--verbose"]
//! exclude = [".git*", "*.scss"]
//! delete = true                 # remove remote files missing locally
//!
//! [deploy.pages]
//! remote = "origin"             # remote name or URL to push to
//! branch = "gh-pages"
//! message = "Deploy site"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub rsync: RsyncConfig,
    pub pages: PagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RsyncConfig {
    /// `user@host`; empty for a local destination.
    pub host: String,
    pub dest: String,
    pub args: Vec<String>,
    pub exclude: Vec<String>,
    pub delete: bool,
}

impl Default for RsyncConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            dest: String::new(),
            args: vec!["--verbose".to_string()],
            exclude: vec![".git*".to_string()],
            delete: true,
        }
    }
}

impl RsyncConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.dest.trim().is_empty() {
            diag.error("deploy.rsync.dest", "is required for `kiln deploy rsync`");
        }
    }

    /// rsync destination operand: `host:dest` or `dest`.
    pub fn target(&self) -> String {
        if self.host.is_empty() {
            self.dest.clone()
        } else {
            format!("{}:{}", self.host, self.dest)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub remote: String,
    pub branch: String,
    pub message: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "gh-pages".to_string(),
            message: "Deploy site".to_string(),
        }
    }
}

impl PagesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.branch.trim().is_empty() {
            diag.error("deploy.pages.branch", "must not be empty");
        }
        if self.remote.trim().is_empty() {
            diag.error("deploy.pages.remote", "must not be empty");
        }
    }
}
