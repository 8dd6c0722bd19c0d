use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::exec::{auth_failure, basic_credential, handle_response};
use crate::headers;
use crate::headers::CONTENT_TYPE_JSON;
use crate::request::{NewSequenceRevision, PanelLocator, RevisionLocator};
use crate::response::{
    AuthResponse, Dialogue, DialoguesEnvelope, Panel, PanelsEnvelope, SequenceRevision,
};
use crate::session::{Identity, SessionState, Token};
use crate::sign::Content;

/// Async client for the tracking service.
///
/// The client owns the session state (identity + short-lived token)
/// behind a mutex: callers racing on an expiring token serialize on the
/// lock and share a single refresh instead of issuing duplicates.
pub struct Client {
    http: reqwest::Client,
    session: Mutex<SessionState>,
}

impl Client {
    /// Creates a new client with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with a custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host);

        if let Some(keepalive) = config.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            session: Mutex::new(SessionState::default()),
        })
    }

    /// Exchanges login/password for a short-lived token.
    ///
    /// On success the identity and token are stored together, so later
    /// calls can refresh transparently when the token nears expiry.
    pub async fn authenticate(
        &self,
        hostname: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Token> {
        let identity = Identity {
            hostname: hostname.into(),
            login: login.into(),
            password: password.into(),
        };
        let token = self.request_token(&identity).await?;
        let mut session = self.session.lock().await;
        session.install(identity, token.clone());
        Ok(token)
    }

    /// Clears the stored identity and token.
    pub async fn reset(&self) {
        self.session.lock().await.reset();
    }

    /// Builds the signed header set (Authorization, Content-Type, Date)
    /// for one outgoing request, refreshing the token when needed.
    ///
    /// Exposed so callers can issue their own signed calls against
    /// endpoints this client does not wrap.
    pub async fn signed_headers(
        &self,
        method: &str,
        url: &str,
        content: &Content,
    ) -> Result<HeaderMap> {
        let token = self.current_token().await?;
        headers::signed_headers(&token, method, url, content, Utc::now())
    }

    /// Fetches one sequence revision.
    pub async fn sequence_revision(&self, locator: &RevisionLocator) -> Result<SequenceRevision> {
        self.get_json(&locator.path()).await
    }

    /// Fetches the panels of a sequence revision.
    pub async fn sequence_revision_panels(&self, locator: &RevisionLocator) -> Result<Vec<Panel>> {
        let envelope: PanelsEnvelope = self.get_json(&locator.panels_path()).await?;
        Ok(envelope.panels)
    }

    /// Fetches the dialogues of a sequence revision.
    pub async fn revision_dialogues(&self, locator: &RevisionLocator) -> Result<Vec<Dialogue>> {
        let envelope: DialoguesEnvelope = self.get_json(&locator.dialogues_path()).await?;
        Ok(envelope.dialogues)
    }

    /// Fetches the dialogues of one panel.
    pub async fn panel_dialogues(&self, locator: &PanelLocator) -> Result<Vec<Dialogue>> {
        let envelope: DialoguesEnvelope = self.get_json(&locator.dialogues_path()).await?;
        Ok(envelope.dialogues)
    }

    /// Creates a new sequence revision.
    ///
    /// The signature fingerprint is computed over exactly the serialized
    /// body bytes sent on the wire.
    pub async fn create_sequence_revision(
        &self,
        show_id: i64,
        sequence_id: i64,
        payload: &NewSequenceRevision,
    ) -> Result<SequenceRevision> {
        let path = format!("/show/{}/sequence/{}/revision", show_id, sequence_id);
        let value = serde_json::to_value(payload)?;
        let body = value.to_string();
        let headers = self.signed_headers("POST", &path, &Content::Json(value)).await?;
        let hostname = self.hostname().await?;

        let response = self
            .http
            .post(format!("{}{}", hostname, path))
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        handle_response(status, text)
    }

    /// Performs the credential exchange against `/authenticate`.
    async fn request_token(&self, identity: &Identity) -> Result<Token> {
        debug!(hostname = %identity.hostname, login = %identity.login, "authenticating");

        let response = self
            .http
            .post(format!("{}/authenticate", identity.hostname))
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(
                AUTHORIZATION,
                basic_credential(&identity.login, &identity.password),
            )
            .send()
            .await
            .map_err(ClientError::AuthTransport)?;

        let status = response.status();
        let text = response.text().await.map_err(ClientError::AuthTransport)?;
        if !status.is_success() {
            return Err(auth_failure(status, &text));
        }

        let body: AuthResponse = serde_json::from_str(&text)?;
        Token::from_response(body)
    }

    /// Returns a token valid beyond the refresh margin, refreshing
    /// through the stored identity when needed. The check and the
    /// refresh both run under the session lock.
    async fn current_token(&self) -> Result<Token> {
        let mut session = self.session.lock().await;

        if let Some(token) = session.token.as_ref()
            && !token.expires_within_margin(Utc::now())
        {
            return Ok(token.clone());
        }

        let identity = session.identity.clone().ok_or_else(|| {
            ClientError::Credential("no stored identity: call authenticate() first".to_string())
        })?;
        debug!(hostname = %identity.hostname, "token missing or near expiry, refreshing");
        let token = self.request_token(&identity).await?;
        session.token = Some(token.clone());
        Ok(token)
    }

    async fn hostname(&self) -> Result<String> {
        let session = self.session.lock().await;
        session
            .identity
            .as_ref()
            .map(|identity| identity.hostname.clone())
            .ok_or_else(|| {
                ClientError::Credential("no stored identity: call authenticate() first".to_string())
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let headers = self.signed_headers("GET", path, &Content::Empty).await?;
        let hostname = self.hostname().await?;

        let response = self
            .http
            .get(format!("{}{}", hostname, path))
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        handle_response(status, text)
    }
}
