//! HTTP surface for input-from-web.
//!
//! Serves the editing page, accepts `POST /send` and forwards authorised text
//! to the injection dispatcher. The token authority decides which requests
//! may reach the dispatcher at all.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod page;
pub mod routes;
pub mod state;

pub use auth::{AuthError, LinkMode, TokenAuthority};
pub use error::ApiError;
pub use page::PageConfig;
pub use routes::{create_router, start_server};
pub use state::AppState;
