//! Authenticated request gateway
//!
//! Attaches the stored access token to outgoing requests and, when the
//! backend answers `401 Unauthorized`, renews the token once with the stored
//! refresh token and replays the request. If renewal fails the session is
//! wiped and the navigator is sent to the login page.

use crate::client::config::RefreshMode;
use crate::client::error::ClientError;
use crate::client::navigation::{LoginRedirect, Navigator};
use crate::client::request::{ApiRequest, RequestBody, build_form};
use crate::types::{RefreshRequest, RefreshResponse};
use fundraiser_core::Session;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Settings the gateway needs besides its collaborators
#[derive(Debug, Clone)]
pub(crate) struct GatewaySettings {
    pub base_url: String,
    pub refresh_path: String,
    pub refresh_mode: RefreshMode,
    pub redirect: LoginRedirect,
}

/// Single entry point for backend calls
#[derive(Clone)]
pub struct AuthGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    http: Client,
    session: Session,
    navigator: Arc<dyn Navigator>,
    settings: GatewaySettings,
    refresh_lock: Mutex<()>,
}

/// Outcome of a token renewal attempt
enum Renewal {
    Renewed(String),
    /// Renewal failed and the session has been wiped
    Expired,
}

impl AuthGateway {
    pub(crate) fn new(
        http: Client,
        session: Session,
        navigator: Arc<dyn Navigator>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                http,
                session,
                navigator,
                settings,
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn base_url(&self) -> &str {
        &self.inner.settings.base_url
    }

    pub fn refresh_mode(&self) -> RefreshMode {
        self.inner.settings.refresh_mode
    }

    /// Send `request`, renewing the access token at most once.
    ///
    /// Returns the response of the last attempt whatever its status.
    /// A transport failure of the first attempt is returned as an error;
    /// transport failures while renewing or replaying count as a failed
    /// renewal and yield the original `401`.
    #[tracing::instrument(
        name = "gateway.send",
        skip_all,
        fields(method = %request.method, path = %request.target)
    )]
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ClientError> {
        let url = self.resolve(&request.target);
        let token = self.inner.session.access_token().await?;

        let response = self.dispatch(&url, &request, token.as_deref()).await?;
        debug!(status = %response.status(), authenticated = token.is_some(), "First attempt");

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(refresh) = self.inner.session.refresh_token().await? else {
            debug!("Unauthorized and no refresh token stored");
            return Ok(response);
        };

        match self.renew(token.as_deref(), refresh).await? {
            Renewal::Renewed(access) => match self.dispatch(&url, &request, Some(&access)).await {
                Ok(retried) => {
                    debug!(status = %retried.status(), "Retried with renewed token");
                    Ok(retried)
                }
                // an unreachable replay ends the session like a failed renewal
                Err(ClientError::Request(e)) => {
                    warn!("Retry with renewed token failed: {e}");
                    self.expire_session().await?;
                    Ok(response)
                }
                Err(e) => Err(e),
            },
            Renewal::Expired => Ok(response),
        }
    }

    fn resolve(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            return target.to_string();
        }
        let base = &self.inner.settings.base_url;
        if target.starts_with('/') {
            format!("{base}{target}")
        } else {
            format!("{base}/{target}")
        }
    }

    async fn dispatch(
        &self,
        url: &str,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut headers = request.headers.clone();

        match &request.body {
            // reqwest writes the boundary into the content type
            RequestBody::Multipart(_) => {
                headers.remove(CONTENT_TYPE);
            }
            RequestBody::Binary(_) => {}
            RequestBody::Empty | RequestBody::Json(_) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
        }

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ClientError::Configuration("stored access token is not a valid header".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .headers(headers);

        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) | RequestBody::Binary(bytes) => builder.body(bytes.clone()),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        Ok(builder.send().await?)
    }

    async fn renew(&self, used: Option<&str>, refresh: String) -> Result<Renewal, ClientError> {
        match self.inner.settings.refresh_mode {
            RefreshMode::PerRequest => self.refresh_or_expire(&refresh).await,
            RefreshMode::SingleFlight => {
                // held until the session is either renewed or wiped
                let _guard = self.inner.refresh_lock.lock().await;

                let current = self.inner.session.access_token().await?;
                if let Some(current) = current {
                    if used != Some(current.as_str()) {
                        debug!("Reusing token renewed by a concurrent request");
                        return Ok(Renewal::Renewed(current));
                    }
                }

                match self.inner.session.refresh_token().await? {
                    Some(refresh) => self.refresh_or_expire(&refresh).await,
                    // an earlier renewal already failed and wiped the session
                    None => Ok(Renewal::Expired),
                }
            }
        }
    }

    async fn refresh_or_expire(&self, refresh: &str) -> Result<Renewal, ClientError> {
        match self.refresh_access_token(refresh).await? {
            Some(access) => Ok(Renewal::Renewed(access)),
            None => {
                self.expire_session().await?;
                Ok(Renewal::Expired)
            }
        }
    }

    /// Exchange the refresh token for a new access token and store it.
    ///
    /// Any failure of the exchange itself yields `None`; only storage errors
    /// are returned.
    async fn refresh_access_token(&self, refresh: &str) -> Result<Option<String>, ClientError> {
        let url = self.resolve(&self.inner.settings.refresh_path);
        let result = self
            .inner
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh: refresh.to_string(),
            })
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Token refresh request failed: {e}");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Token refresh rejected");
            return Ok(None);
        }

        let body: RefreshResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Token refresh returned an unreadable body: {e}");
                return Ok(None);
            }
        };

        self.inner.session.set_access_token(&body.access).await?;
        info!("Access token renewed");
        Ok(Some(body.access))
    }

    async fn expire_session(&self) -> Result<(), ClientError> {
        warn!("Session could not be renewed, clearing credentials");
        self.inner.session.clear().await?;
        self.inner
            .settings
            .redirect
            .apply(self.inner.navigator.as_ref());
        Ok(())
    }
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway")
            .field("base_url", &self.inner.settings.base_url)
            .field("refresh_mode", &self.inner.settings.refresh_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::navigation::NoopNavigator;

    fn gateway(base_url: &str) -> AuthGateway {
        AuthGateway::new(
            Client::new(),
            Session::in_memory(),
            Arc::new(NoopNavigator),
            GatewaySettings {
                base_url: base_url.to_string(),
                refresh_path: "/api/token/refresh/".to_string(),
                refresh_mode: RefreshMode::PerRequest,
                redirect: LoginRedirect::default(),
            },
        )
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let gw = gateway("http://localhost:8000");
        assert_eq!(gw.resolve("/api/x/"), "http://localhost:8000/api/x/");
        assert_eq!(gw.resolve("api/x/"), "http://localhost:8000/api/x/");
        assert_eq!(
            gw.resolve("https://pay.example.com/start"),
            "https://pay.example.com/start"
        );
    }
}
