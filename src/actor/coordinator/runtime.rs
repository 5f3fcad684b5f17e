use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::build::BuildActor;
use crate::actor::fs::FsActor;
use crate::actor::messages::{BuildMsg, WsMsg};
use crate::actor::ws::WsActor;

/// How long a running build may take to finish after shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Run all actors concurrently, then stop them in pipeline order.
pub(super) async fn run_actors(
    fs: FsActor,
    build: BuildActor,
    ws: WsActor,
    build_tx: mpsc::Sender<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let fs_handle = tokio::spawn(fs.run());
    let build_handle = tokio::spawn(build.run());
    let ws_handle = tokio::spawn(ws.run());

    match shutdown_rx {
        Some(rx) => loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        },
        None => {
            let _ = fs_handle.await;
        }
    }

    let _ = build_tx.send(BuildMsg::Shutdown).await;
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, build_handle).await;

    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, ws_handle).await;
}
