//! Fundraiser HTTP client
//!
//! Every backend call goes through [`client::gateway::AuthGateway`], which
//! attaches the stored bearer token and transparently renews it once when the
//! backend answers `401 Unauthorized`.

pub mod client;
pub mod types;

pub use client::error::ClientError;
pub use client::{FundraiserClient, FundraiserClientBuilder};
pub use reqwest::{Method, StatusCode};
