//! Core process state shared across commands.

mod state;

pub use state::{
    CancelFlag, is_serving, is_shutdown, register_server, session_cancel, set_serving,
    setup_shutdown_handler,
};
