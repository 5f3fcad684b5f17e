use std::net::TcpStream;
use std::time::Duration;

use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::HotReloadMessage;

impl WsActor {
    /// Handshake, greet, and replay the pending error if there is one.
    pub(super) fn add_client(&self, stream: TcpStream) {
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };
        // Reads are polled from the reader thread
        let _ = ws.get_ref().set_nonblocking(true);

        let mut greeting = vec![HotReloadMessage::connected()];
        greeting.extend(self.pending_error.lock().clone());

        for msg in greeting {
            if let Err(e) = ws.send(Message::Text(msg.to_json().into())) {
                crate::log!("ws"; "failed to greet client: {}", e);
                return;
            }
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }
}

/// Drain client frames so closes are noticed; clients send nothing else.
pub(super) fn reader_loop(clients: Clients) {
    loop {
        std::thread::sleep(Duration::from_millis(100));
        if crate::core::is_shutdown() {
            break;
        }

        clients.lock().retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => true,
            Err(_) => false,
        });
    }
}
