//! Actor message definitions.
//!
//! ```text
//! FsActor --Rebuild--> BuildActor --Reload/Error--> WsActor
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use crate::task::DirtySet;

/// Messages to the build actor
#[derive(Debug)]
pub enum BuildMsg {
    /// Run the closure of `dirty`
    Rebuild {
        dirty: DirtySet,
        /// `kiln.toml` changed: reload it first
        config_changed: bool,
        /// Paths that triggered this run, for the status line
        changed: Vec<PathBuf>,
    },
    Shutdown,
}

/// Messages to the WebSocket actor
#[derive(Debug)]
pub enum WsMsg {
    Reload { reason: String },
    /// A task failed: show an overlay, keep the page
    Error { task: String, message: String },
    ClearError,
    AddClient(TcpStream),
    Shutdown,
}
