//! Process-wide session state.
//!
//! Two flags:
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)
//! - `SERVING`: Has the initial build finished so the server can answer?
//!
//! Builds never read these directly; they receive a [`CancelFlag`] that the
//! shutdown handler trips.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};

use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Site is ready to serve requests (initial build complete)
static SERVING: AtomicBool = AtomicBool::new(false);

/// Cancellation flag shared with every build of this process
static SESSION_CANCEL: LazyLock<CancelFlag> = LazyLock::new(CancelFlag::new);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for actor system
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

// =============================================================================
// CancelFlag
// =============================================================================

/// Cooperative cancellation token checked between task actions.
///
/// Tripping the flag never interrupts a running action; it only prevents
/// not-yet-started work from starting.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Cancellation flag tripped by the Ctrl+C handler.
pub fn session_cancel() -> CancelFlag {
    SESSION_CANCEL.clone()
}

// =============================================================================
// SERVING state
// =============================================================================

pub fn is_serving() -> bool {
    SERVING.load(Ordering::SeqCst)
}

pub fn set_serving() {
    SERVING.store(true, Ordering::SeqCst);
}

// =============================================================================
// SHUTDOWN state
// =============================================================================

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_server()`: trips cancellation, process exits
/// - After `register_server()`: graceful shutdown (unblock server, notify actors)
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        SESSION_CANCEL.cancel();

        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
pub fn register_server(server: Arc<Server>, shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
