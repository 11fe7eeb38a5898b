// wattsvision-api: Async Rust client for the Watts Vision+ cloud device API

pub mod auth;
pub mod client;
mod devices;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{AuthProvider, OAuthConfig, Token};
pub use client::VisionClient;
pub use error::Error;
