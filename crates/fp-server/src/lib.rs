//! HTTP server for Flowerpress.
//!
//! Exposes Markdown bodies, assets, and document metadata of each space to
//! the browser editor. Storage goes through [`fp_service::StorageService`];
//! metadata lives in an [`fp_index::DocumentIndex`] owned by the server.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::FlowerpressServer;
pub use state::AppState;
