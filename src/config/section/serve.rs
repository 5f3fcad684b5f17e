//! `[serve]` section configuration.
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # 0.0.0.0 to make the server reachable from LAN
//! port = 8000                 # HTTP port
//! ws_port = 35729             # live-reload WebSocket port
//! watch = true                # rebuild on file changes
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub interface: IpAddr,
    pub port: u16,
    /// Preferred WebSocket port; the next free port is used when taken.
    pub ws_port: u16,
    pub watch: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            ws_port: 35729,
            watch: true,
        }
    }
}
