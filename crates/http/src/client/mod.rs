//! Fundraiser API client

pub mod auth;
pub mod campaign;
pub mod config;
pub mod error;
pub mod gateway;
pub mod navigation;
pub mod request;

use config::{ClientConfig, RefreshMode};
use error::ClientError;
use fundraiser_core::Session;
use gateway::{AuthGateway, GatewaySettings};
use navigation::{LoginRedirect, Navigator, NoopNavigator};
use request::ApiRequest;
use reqwest::{ClientBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Fundraiser API client.
///
/// All calls are routed through the [`AuthGateway`], so they share its token
/// renewal behavior.
#[derive(Clone, Debug)]
pub struct FundraiserClient {
    gateway: AuthGateway,
}

impl FundraiserClient {
    /// Create a new client with default configuration and an in-memory session
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> FundraiserClientBuilder {
        FundraiserClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.gateway.base_url()
    }

    pub fn session(&self) -> &Session {
        self.gateway.session()
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    /// Send a raw request through the gateway
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ClientError> {
        self.gateway.send(request).await
    }

    /// Send a request and decode a successful JSON response
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }
}

/// Builder for FundraiserClient
#[derive(Default)]
pub struct FundraiserClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    session: Option<Session>,
    navigator: Option<Arc<dyn Navigator>>,
    refresh_path: Option<String>,
    refresh_mode: RefreshMode,
    redirect: LoginRedirect,
}

impl FundraiserClientBuilder {
    /// Start from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default()
            .base_url(config.base_url.clone())
            .user_agent(config.user_agent.clone())
            .refresh_path(config.refresh_path.clone())
            .login_path(config.login_path.clone())
            .exempt_paths(config.exempt_paths.clone())
            .refresh_mode(config.refresh_mode);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        builder
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use an existing session instead of a fresh in-memory one
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the navigator that receives login redirects
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Set the token refresh endpoint path
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    pub fn refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.refresh_mode = mode;
        self
    }

    /// Set the login redirect target
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.redirect.login_path = path.into();
        self
    }

    /// Set the path fragments on which no login redirect happens
    pub fn exempt_paths(mut self, paths: Vec<String>) -> Self {
        self.redirect.exempt_paths = paths;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<FundraiserClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("fundraiser-client/{}", env!("CARGO_PKG_VERSION")));
        client_builder = client_builder.user_agent(user_agent);

        let http = client_builder.build()?;

        let settings = GatewaySettings {
            base_url,
            refresh_path: self
                .refresh_path
                .unwrap_or_else(|| config::DEFAULT_REFRESH_PATH.to_string()),
            refresh_mode: self.refresh_mode,
            redirect: self.redirect,
        };

        let gateway = AuthGateway::new(
            http,
            self.session.unwrap_or_else(Session::in_memory),
            self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator)),
            settings,
        );

        Ok(FundraiserClient { gateway })
    }
}
