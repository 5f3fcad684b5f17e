//! Configuration section definitions.

mod build;
mod deploy;
mod serve;
mod site;

pub use build::BuildConfig;
pub use deploy::{DeployConfig, PagesConfig, RsyncConfig};
pub use serve::ServeConfig;
pub use site::SiteInfo;
