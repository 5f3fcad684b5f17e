//! Fire-and-forget handle for pushing reload messages.

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::actor::messages::WsMsg;

/// Never blocks the caller: a full or closed channel drops the message.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<WsMsg>,
}

impl Notifier {
    pub fn new(tx: mpsc::Sender<WsMsg>) -> Self {
        Self { tx }
    }

    pub fn reload(&self, reason: impl Into<String>) {
        self.send(WsMsg::Reload {
            reason: reason.into(),
        });
    }

    pub fn error(&self, task: impl Into<String>, message: impl Into<String>) {
        self.send(WsMsg::Error {
            task: task.into(),
            message: message.into(),
        });
    }

    pub fn clear_error(&self) {
        self.send(WsMsg::ClearError);
    }

    fn send(&self, msg: WsMsg) {
        match self.tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) => crate::debug!("reload"; "channel full, dropped {msg:?}"),
            Err(TrySendError::Closed(_)) => crate::debug!("reload"; "no websocket actor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_channel_drops_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let notifier = Notifier::new(tx);

        notifier.reload("first");
        notifier.reload("second");

        assert!(matches!(rx.try_recv(), Ok(WsMsg::Reload { reason }) if reason == "first"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        Notifier::new(tx).clear_error();
    }
}
