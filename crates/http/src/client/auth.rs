//! Authentication API client methods

use super::{ClientError, FundraiserClient};
use crate::client::request::ApiRequest;
use crate::types::{
    AuthStatusResponse, LoginRequest, MessageResponse, OtpRequest, RegisterRequest,
    RegisterResponse, TokenResponse, VerifyOtpRequest,
};
use fundraiser_core::{Credentials, UserProfile};
use tracing::{info, warn};

impl FundraiserClient {
    /// Log in with username and password and persist the returned session
    pub async fn login(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<UserProfile, ClientError> {
        let request = ApiRequest::post("/api/users/login/").json(&LoginRequest {
            username: username.into(),
            password: password.into(),
        })?;
        let tokens: TokenResponse = self.execute(request).await?;
        self.store_tokens(tokens).await
    }

    /// Ask the backend to email a one-time password
    pub async fn send_otp(&self, email: impl Into<String>) -> Result<String, ClientError> {
        let request = ApiRequest::post("/api/users/send-otp/").json(&OtpRequest {
            email: email.into(),
        })?;
        let response: MessageResponse = self.execute(request).await?;
        Ok(response.message)
    }

    /// Exchange an emailed one-time password for a guest session
    pub async fn verify_otp(
        &self,
        email: impl Into<String>,
        otp: impl Into<String>,
    ) -> Result<UserProfile, ClientError> {
        let request = ApiRequest::post("/api/users/verify-otp/").json(&VerifyOtpRequest {
            email: email.into(),
            otp: otp.into(),
        })?;
        let tokens: TokenResponse = self.execute(request).await?;
        self.store_tokens(tokens).await
    }

    /// Register a new account. Does not log in.
    pub async fn register(
        &self,
        registration: &RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        let request = ApiRequest::post("/api/users/register/").json(registration)?;
        self.execute(request).await
    }

    /// Fetch the current user's profile and refresh the cached copy
    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        let user: UserProfile = self.execute(ApiRequest::get("/api/users/profile/")).await?;
        self.session().set_user(&user).await?;
        Ok(user)
    }

    /// Synchronize the local session with the backend's view.
    ///
    /// When the backend reports an authenticated user, the cached user (and
    /// any tokens it hands out) are stored. When it does not, the local
    /// session is cleared. If the backend cannot be reached or answers with
    /// something unreadable, the cached user is returned unchanged.
    pub async fn auth_status(&self) -> Result<Option<UserProfile>, ClientError> {
        let response = match self.send(ApiRequest::get("/api/users/auth-status/")).await {
            Ok(response) => response,
            Err(ClientError::Request(e)) => {
                warn!("Auth status check failed: {e}");
                return Ok(self.session().user().await?);
            }
            Err(e) => return Err(e),
        };

        let status: AuthStatusResponse = match response.json().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Auth status check returned an unreadable body: {e}");
                return Ok(self.session().user().await?);
            }
        };

        if !status.authenticated {
            self.session().clear().await?;
            return Ok(None);
        }

        if let Some(user) = &status.user {
            self.session().set_user(user).await?;
        }
        match (status.access, status.refresh) {
            (Some(access), Some(refresh)) => {
                self.session()
                    .set_tokens(&Credentials { access, refresh })
                    .await?;
            }
            (Some(access), None) => self.session().set_access_token(&access).await?,
            _ => {}
        }

        Ok(status.user)
    }

    /// End the session.
    ///
    /// The backend is told when a token is stored, but local credentials are
    /// cleared whether or not that call succeeds.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if self.session().access_token().await?.is_some() {
            match self.send(ApiRequest::post("/api/users/logout/")).await {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "Logout API call failed");
                }
                Ok(_) => {}
                Err(e) => warn!("Logout API call failed: {e}"),
            }
        }

        self.session().clear().await?;
        info!("Logged out");
        Ok(())
    }

    async fn store_tokens(&self, tokens: TokenResponse) -> Result<UserProfile, ClientError> {
        self.session()
            .set_tokens(&Credentials {
                access: tokens.access,
                refresh: tokens.refresh,
            })
            .await?;
        self.session().set_user(&tokens.user).await?;
        info!(user = %tokens.user.display_name(), "Session stored");
        Ok(tokens.user)
    }
}
