//! Actor system for watch mode.
//!
//! Message-passing concurrency between the file watcher, the build
//! scheduler and the live-reload socket:
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing and routing
//! - `build` - Runs the scheduler for each routed batch
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod build;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
