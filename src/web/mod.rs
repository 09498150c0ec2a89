//! HTTP relay server: endpoints, viewer page, and serve loop.
//!
//! The server holds the latest pushed frame and serves a polling page
//! that reloads whenever the frame's token changes.

mod handlers;
mod page;
mod server;

pub use server::RelayServer;
