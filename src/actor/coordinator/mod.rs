//! Wires the watch-mode actors together.
//!
//! ```text
//! FsActor ──BuildMsg──► BuildActor ──WsMsg──► WsActor
//! (watch)               (scheduler)         (broadcast)
//! ```
//!
//! The coordinator is created before the initial build so the watcher is
//! already attached while it runs.

mod runtime;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::build::BuildActor;
use super::fs::{ChangeRouter, FsActor};
use super::messages::{BuildMsg, WsMsg};
use super::ws::WsActor;
use crate::reload::Notifier;
use crate::task::{BuildContext, TaskGraph};

const CHANNEL_BUFFER: usize = 32;

pub struct Coordinator {
    graph: Arc<TaskGraph>,
    ctx: Arc<BuildContext>,
    fs: FsActor,
    build_tx: mpsc::Sender<BuildMsg>,
    build_rx: mpsc::Receiver<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    ws_rx: mpsc::Receiver<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    /// Compile the input patterns and attach the file watcher.
    pub fn new(graph: Arc<TaskGraph>, ctx: Arc<BuildContext>) -> Result<Self> {
        let config = ctx.config();
        let router = ChangeRouter::new(&graph, &config.root, &config.config_path)
            .context("invalid task input pattern")?;

        let (build_tx, build_rx) = mpsc::channel(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel(CHANNEL_BUFFER);
        let fs = FsActor::new(&config, router, build_tx.clone()).context("watcher failed")?;

        Ok(Self {
            graph,
            ctx,
            fs,
            build_tx,
            build_rx,
            ws_tx,
            ws_rx,
            shutdown_rx: None,
        })
    }

    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Bind the live-reload socket near `base_port`; returns the bound port.
    pub fn start_ws_server(&self, base_port: u16) -> Result<u16> {
        crate::reload::server::start_ws_server(base_port, self.ws_tx.clone())
    }

    /// Handle for reporting build outcomes to connected browsers.
    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.ws_tx.clone())
    }

    /// Run every actor until shutdown.
    pub async fn run(self) -> Result<()> {
        let notifier = self.notifier();
        let Self {
            graph,
            ctx,
            fs,
            build_tx,
            build_rx,
            ws_tx,
            ws_rx,
            shutdown_rx,
        } = self;

        let build = BuildActor::new(build_rx, graph, ctx, notifier);
        let ws = WsActor::new(ws_rx);

        crate::debug!("actor"; "start");
        runtime::run_actors(fs, build, ws, build_tx, ws_tx, shutdown_rx).await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
