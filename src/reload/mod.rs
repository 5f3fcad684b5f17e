//! Live reload for `kiln serve`.
//!
//! ```text
//! BuildActor ──Notifier (try_send)──► WsActor ──JSON frames──► hotreload.js
//!                                        ▲
//!                            server.rs ──┘ (accepted sockets)
//! ```

pub mod message;
mod notifier;
pub mod server;

pub use message::HotReloadMessage;
pub use notifier::Notifier;
