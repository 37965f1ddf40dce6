pub mod error;
pub mod handlers;
pub mod router;

pub use error::ApiError;
pub use router::{create_router, serve, AppState};
