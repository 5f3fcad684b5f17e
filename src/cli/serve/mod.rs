//! Development server with live reload.
//!
//! ```text
//! main thread:       HTTP request loop (rayon pool)
//! background thread: initial build → set_serving → actor system
//! ```

mod lifecycle;
mod path;
mod response;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel;
use tiny_http::{Request, Server};

use super::build;
use crate::actor::Coordinator;
use crate::config::{Overrides, SiteConfig};
use crate::core::{is_serving, is_shutdown, register_server, set_serving};
use crate::logger::status_error;
use crate::task::site;
use crate::{debug, log};

/// Concurrent request handlers
const REQUEST_THREADS: usize = 4;

/// What request handlers need to answer.
struct ServeState {
    output: PathBuf,
    /// Bound live-reload port, when watching
    ws_port: Option<u16>,
}

/// `kiln serve`: build, serve the output directory, rebuild on change.
pub fn serve(config: SiteConfig, overrides: Overrides) -> Result<()> {
    let graph = Arc::new(site::graph(&config)?);
    build::clean(&config)?;
    let ctx = build::context(config.clone(), overrides);

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    // The watcher attaches before the initial build so no edit is missed.
    let coordinator = if config.serve.watch {
        Some(Coordinator::new(Arc::clone(&graph), Arc::clone(&ctx))?.with_shutdown_signal(shutdown_rx))
    } else {
        None
    };
    let ws_port = coordinator.as_ref().and_then(|c| {
        c.start_ws_server(config.serve.ws_port)
            .inspect(|port| debug!("hotreload"; "ws://localhost:{}", port))
            .inspect_err(|e| log!("hotreload"; "websocket server failed: {}", e))
            .ok()
    });

    let background = std::thread::spawn(move || {
        if let Err(e) = build::full_build(&graph, &ctx) {
            status_error("initial build failed", &format!("{e:#}"));
            if let Some(coordinator) = &coordinator {
                coordinator.notifier().error("build", format!("{e:#}"));
            }
        }
        set_serving();

        if let Some(coordinator) = coordinator
            && let Err(e) = lifecycle::run_actor_system(coordinator)
        {
            log!("actor"; "error: {}", e);
        }
    });

    log!("serve"; "http://{}", addr);
    let state = Arc::new(ServeState {
        output: config.output_dir(),
        ws_port,
    });
    run_request_loop(&server, &state)?;
    lifecycle::wait_for_shutdown(background);
    Ok(())
}

fn run_request_loop(server: &Server, state: &Arc<ServeState>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()?;

    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }
    if !is_serving() {
        return response::respond_building(request);
    }

    match path::resolve(request.url(), &state.output) {
        Some(file) => response::respond_file(request, &file, state.ws_port),
        None => response::respond_not_found(request, &state.output, state.ws_port),
    }
}
