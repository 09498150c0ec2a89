//! View plots rendered in one process from a browser running anywhere.
//!
//! A [`Plotter`] (or a bare [`RelayClient`]) pushes each newly rendered
//! frame to a small HTTP server running in its own worker process. A
//! browser pointed at the server polls for changes and reloads the page
//! whenever a new frame arrives, so a plotting call issued over SSH shows
//! up in a local browser tab moments later.

pub mod client;
pub mod config;
pub mod error;
pub mod plot;
pub mod store;
pub mod web;

pub use client::RelayClient;
pub use config::RelaySettings;
pub use error::RelayError;
pub use plot::{PlotOp, Plotter, RenderEngine};
pub use store::FrameStore;
pub use web::RelayServer;
