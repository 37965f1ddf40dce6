//! Video upload service: an in-memory registry of video metadata plus a
//! gateway that streams video payloads in and out of an object store.

pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod registry;
pub mod server;
pub mod storage;

pub use config::Config;
pub use error::StorageError;
pub use gateway::DataGateway;
pub use model::{VideoMetadata, VideoState, VideoStatus};
pub use registry::VideoRegistry;
