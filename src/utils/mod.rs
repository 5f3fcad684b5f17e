//! Shared helpers with no pipeline knowledge.

pub mod date;
pub mod exec;
pub mod hash;
pub mod html;
pub mod mime;
pub mod path;
pub mod slug;
