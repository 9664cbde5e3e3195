//! Channel abstraction for activity I/O.

pub mod channel;
pub mod cli;
pub mod http;
pub mod manager;

pub use channel::*;
pub use cli::CliChannel;
pub use http::{HttpState, http_routes};
pub use manager::ChannelManager;
