//! IPC module for daemon/view-layer communication

mod protocol;
mod server;

pub use protocol::DaemonStatus;
pub use server::{Handles, Server};
