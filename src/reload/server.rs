//! WebSocket listener for live reload.
//!
//! Accepted sockets are handed to the WebSocket actor, which owns every
//! client connection.

use std::net::{Ipv4Addr, TcpListener};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;

/// Ports tried after the configured one is taken
const MAX_PORT_RETRIES: u16 = 10;

/// Bind near `base_port` and forward accepted clients. Returns the bound port.
pub fn start_ws_server(base_port: u16, ws_tx: mpsc::Sender<WsMsg>) -> Result<u16> {
    let (listener, port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            if crate::core::is_shutdown() {
                break;
            }
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    let _ = stream.set_nonblocking(false);
                    if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok(port)
}

/// Bind `base_port`, or the next free one within `max_retries`.
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((Ipv4Addr::LOCALHOST, port)) {
            Ok(listener) => {
                let port = listener.local_addr()?.port();
                return Ok((listener, port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind websocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_taken_moves_on() {
        let (first, port) = try_bind_port(0, 1).unwrap();
        assert_ne!(port, 0);

        let (_second, next) = try_bind_port(port, 3).unwrap();
        assert_ne!(next, port);
        drop(first);
    }
}
