use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{AppIdentity, CredentialManager};
use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::http::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
use crate::time::Clock;

/// Envelope every open-api response is wrapped in
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: T,
}

/// The part of the envelope the executor inspects
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    msg: String,
}

/// Cloud document open-api client
///
/// Generic over the HTTP client implementation for testability. Clones share
/// the transport and the cached access token.
pub struct Client<H: HttpClient = ReqwestClient> {
    http: Arc<H>,
    config: Arc<ClientConfig>,
    credentials: CredentialManager<H>,
}

impl Client<ReqwestClient> {
    /// Creates a client for the default host with the default HTTP implementation
    pub fn new(identity: AppIdentity) -> Self {
        Self::with_config(identity, ClientConfig::default())
    }

    pub fn with_config(identity: AppIdentity, config: ClientConfig) -> Self {
        Self::with_http_client(identity, config, ReqwestClient::new())
    }
}

impl<H: HttpClient> Client<H> {
    /// Creates a client on top of a custom HTTP implementation
    pub fn with_http_client(identity: AppIdentity, config: ClientConfig, http: H) -> Self {
        let http = Arc::new(http);
        let config = Arc::new(config);
        let credentials = CredentialManager::new(http.clone(), identity, config.clone());
        Self {
            http,
            config,
            credentials,
        }
    }

    /// Like [`Client::with_http_client`], with expiry measured on `clock`
    pub fn with_clock(
        identity: AppIdentity,
        config: ClientConfig,
        http: H,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let http = Arc::new(http);
        let config = Arc::new(config);
        let credentials =
            CredentialManager::with_clock(http.clone(), identity, config.clone(), clock);
        Self {
            http,
            config,
            credentials,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialManager<H> {
        &self.credentials
    }

    /// Returns a currently valid access token
    pub async fn get_access_token(&self) -> Result<String> {
        Ok(self.credentials.get_access_token().await?)
    }

    /// Forgets `stale_token` so the next call fetches a new one
    ///
    /// Meant for callers that saw [`Error::is_token_expired`] and decided the
    /// operation is safe to resend.
    pub fn invalidate_token(&self, stale_token: &str) -> bool {
        self.credentials.invalidate(stale_token)
    }

    /// Joins an api path onto the configured base URL
    pub fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    /// Sends `request` authenticated with `token` and returns the raw body
    ///
    /// Fails with `Error::Transport` if no response arrived and `Error::Api`
    /// if the service answered with a failure status or a non-zero envelope
    /// code. The payload itself is not inspected. Never retries.
    pub async fn execute(&self, mut request: HttpRequest, token: &str) -> Result<Vec<u8>> {
        request.bearer_auth(token)?;
        let method = request.method.clone();
        let url = request.url.clone();

        let response = self.http.execute(request, self.config.timeout()).await?;
        tracing::debug!(%method, %url, status = response.status, "Request completed");

        check_envelope(&response)?;
        Ok(response.body)
    }

    /// Authenticates, executes and decodes `request` into `T`
    pub async fn call<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let token = self.get_access_token().await?;
        let body = self.execute(request, &token).await?;
        serde_json::from_slice(&body).map_err(|e| Error::Decode(e.to_string()))
    }
}

impl<H: HttpClient> Clone for Client<H> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            credentials: self.credentials.clone(),
        }
    }
}

/// Classifies a received response as success or API failure
fn check_envelope(response: &HttpResponse) -> Result<()> {
    let status = response.status;
    match serde_json::from_slice::<Envelope>(&response.body) {
        Ok(envelope) if envelope.code != 0 => Err(ApiError {
            code: envelope.code,
            msg: envelope.msg,
            http_status: status,
        }
        .into()),
        Ok(envelope) if !response.is_success() => Err(ApiError {
            code: i64::from(status),
            msg: envelope.msg,
            http_status: status,
        }
        .into()),
        Ok(_) => Ok(()),
        Err(_) if !response.is_success() => Err(ApiError {
            code: i64::from(status),
            msg: response.text(),
            http_status: status,
        }
        .into()),
        Err(e) => Err(Error::Decode(format!("Response is not an API envelope: {e}"))),
    }
}
