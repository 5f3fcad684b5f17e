//! WebSocket actor: owns client connections and broadcasts reload messages.
//!
//! ```text
//! BuildActor --[Reload/Error]--> WsActor --[broadcast]--> Clients
//! ```
//!
//! The last error is remembered so a page opened while the build is broken
//! shows the overlay straight away.

mod client_io;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::HotReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    clients: Clients,
    pending_error: Arc<Mutex<Option<HotReloadMessage>>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        std::thread::spawn(move || client_io::reader_loop(clients));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "sending reload: {}", reason);
                    self.broadcast(&HotReloadMessage::reload_with_reason(reason));
                }
                WsMsg::Error { task, message } => {
                    let msg = HotReloadMessage::error(task, message);
                    *self.pending_error.lock() = Some(msg.clone());
                    self.broadcast(&msg);
                }
                WsMsg::ClearError => {
                    if self.pending_error.lock().take().is_some() {
                        self.broadcast(&HotReloadMessage::Clear);
                    }
                }
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    for mut ws in self.clients.lock().drain(..) {
                        let _ = ws.close(None);
                    }
                    break;
                }
            }
        }
    }

    /// Send to every client, dropping the ones that fail.
    fn broadcast(&self, msg: &HotReloadMessage) {
        let frame = Message::Text(msg.to_json().into());
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", clients.len());
    }
}
