//! Access-token lifecycle
//!
//! The cached credential is read under a short, non-async lock. When it is
//! missing or inside its safety margin, callers funnel into a single shared
//! refresh: the first one in opens a "flight" (a `OnceCell` in a slot), later
//! arrivals attach to the same cell and receive whatever it resolves to.
//!
//! Ordering inside a refresh matters: the new credential is stored before the
//! slot is cleared, so a caller that misses the flight always finds the fresh
//! credential instead of starting another refresh.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::OnceCell;

use super::credential::{AppIdentity, Credential, IssueTokenRequest, IssueTokenResponse};
use crate::config::ClientConfig;
use crate::error::{CredentialError, TransportError};
use crate::http::{HttpClient, HttpRequest, ReqwestClient};
use crate::time::{Clock, SystemClock};

type Flight = Arc<OnceCell<Result<String, CredentialError>>>;

/// Acquires, caches and refreshes the bearer token shared by a client
pub struct CredentialManager<H: HttpClient = ReqwestClient> {
    inner: Arc<Inner<H>>,
}

struct Inner<H> {
    http: Arc<H>,
    identity: AppIdentity,
    config: Arc<ClientConfig>,
    clock: Arc<dyn Clock>,
    credential: RwLock<Option<Credential>>,
    in_flight: Mutex<Option<Flight>>,
}

impl<H: HttpClient> CredentialManager<H> {
    /// Creates a manager with an empty cache, reading time from the system clock
    pub fn new(http: Arc<H>, identity: AppIdentity, config: Arc<ClientConfig>) -> Self {
        Self::with_clock(http, identity, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        http: Arc<H>,
        identity: AppIdentity,
        config: Arc<ClientConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                identity,
                config,
                clock,
                credential: RwLock::new(None),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Returns a token that is valid now, refreshing it first if needed
    ///
    /// Concurrent callers that find the cache stale share one refresh and all
    /// receive its token or its error. A failed refresh leaves the cache as
    /// it was, so the next call tries again.
    pub async fn get_access_token(&self) -> Result<String, CredentialError> {
        if let Some(token) = self.inner.cached_token() {
            return Ok(token);
        }

        let flight = {
            let mut slot = self.inner.slot();
            // A refresh may have landed between the fast path and taking the slot
            if let Some(token) = self.inner.cached_token() {
                return Ok(token);
            }
            slot.get_or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };

        let outcome = flight.get_or_init(|| self.inner.refresh(&flight)).await;
        outcome.clone()
    }

    /// Drops the cached credential if it still holds `stale_token`
    ///
    /// Returns whether anything was dropped. A token that has already been
    /// replaced by a newer refresh is left alone.
    pub fn invalidate(&self, stale_token: &str) -> bool {
        let mut credential = self.inner.write_credential();
        if credential.as_ref().is_some_and(|c| c.token() == stale_token) {
            tracing::debug!("Access token invalidated");
            *credential = None;
            true
        } else {
            false
        }
    }

    /// Expiry of the cached credential, if any
    pub fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.inner
            .read_credential()
            .as_ref()
            .map(Credential::expires_at)
    }

    pub fn app_id(&self) -> &str {
        self.inner.identity.app_id()
    }
}

impl<H> Clone for CredentialManager<H>
where
    H: HttpClient,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: HttpClient> Inner<H> {
    fn read_credential(&self) -> std::sync::RwLockReadGuard<'_, Option<Credential>> {
        self.credential.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_credential(&self) -> std::sync::RwLockWriteGuard<'_, Option<Credential>> {
        self.credential.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self) -> MutexGuard<'_, Option<Flight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached_token(&self) -> Option<String> {
        let now = self.clock.now();
        self.read_credential()
            .as_ref()
            .filter(|c| c.is_usable_at(now))
            .map(|c| c.token().to_string())
    }

    /// Runs one refresh on behalf of every caller attached to `flight`
    async fn refresh(&self, flight: &Flight) -> Result<String, CredentialError> {
        let result = self.issue().await;

        match &result {
            Ok(credential) => {
                tracing::info!(
                    app_id = self.identity.app_id(),
                    expires_at = %credential.expires_at(),
                    "Access token refreshed"
                );
                *self.write_credential() = Some(credential.clone());
            }
            Err(e) => {
                tracing::warn!(app_id = self.identity.app_id(), error = %e, "Access token refresh failed");
            }
        }

        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|f| Arc::ptr_eq(f, flight)) {
            *slot = None;
        }

        result.map(|c| c.token().to_string())
    }

    /// Calls the issuance endpoint once
    async fn issue(&self) -> Result<Credential, CredentialError> {
        let url = self.config.url(self.config.token_kind.issue_path());
        let request = HttpRequest::post(url)
            .json(&IssueTokenRequest::from(&self.identity))
            .map_err(|e| CredentialError::Decode(format!("Failed to encode token request: {e}")))?;

        // Lifetime is counted from before the request went out
        let issued_at = self.clock.now();
        let timeout = self.config.timeout();

        // The transport is trusted to honour the budget, but the slot must be
        // freed even if it doesn't
        let response = tokio::time::timeout(timeout, self.http.execute(request, timeout))
            .await
            .map_err(|_| CredentialError::Transport(TransportError::Timeout(timeout)))?
            .map_err(CredentialError::Transport)?;

        let body: IssueTokenResponse = match serde_json::from_slice(&response.body) {
            Ok(body) => body,
            Err(_) if !response.is_success() => {
                return Err(CredentialError::Rejected {
                    code: i64::from(response.status),
                    msg: response.text(),
                });
            }
            Err(e) => return Err(CredentialError::Decode(e.to_string())),
        };

        if !response.is_success() && body.code == 0 {
            return Err(CredentialError::Rejected {
                code: i64::from(response.status),
                msg: body.msg,
            });
        }

        let (token, lifetime) = body.into_issued(self.config.token_kind)?;
        let credential =
            Credential::issued(token, issued_at, lifetime, self.config.refresh_margin())?;

        // A slow issuance of a short-lived token can land already inside its margin
        if !credential.is_usable_at(self.clock.now()) {
            return Err(CredentialError::Decode(
                "token expired before it could be used".into(),
            ));
        }
        Ok(credential)
    }
}
