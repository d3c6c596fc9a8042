//! HTTP access to the club website API.
//!
//! - **`client`**: `ApiClient`, implementing the engine's `FileBackend` and
//!   `LinkPreviewSource` plus post fetch/save
//! - **`session`**: bearer token state and the refresh-and-retry policy
//! - **`token`**: token file persistence
//! - **`error`**: `ClientError`

pub mod client;
pub mod error;
pub mod session;
pub mod token;

#[cfg(test)]
mod test_server;

pub use client::ApiClient;
pub use error::ClientError;
pub use session::{Reply, Session};
pub use token::TokenStore;
