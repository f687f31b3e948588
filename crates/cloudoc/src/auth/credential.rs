use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CredentialError;

const ENV_APP_ID: &str = "CLOUDOC_APP_ID";
const ENV_APP_SECRET: &str = "CLOUDOC_APP_SECRET";

/// Application identity used to mint access tokens
#[derive(Clone, PartialEq, Eq)]
pub struct AppIdentity {
    app_id: String,
    app_secret: String,
}

impl AppIdentity {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    /// Reads `CLOUDOC_APP_ID` and `CLOUDOC_APP_SECRET`
    pub fn from_env() -> Option<Self> {
        let app_id = std::env::var(ENV_APP_ID).ok()?;
        let app_secret = std::env::var(ENV_APP_SECRET).ok()?;
        Some(Self::new(app_id, app_secret))
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

impl fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppIdentity")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

/// Which flavour of access token the client presents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Acts as the app within its installed tenant
    #[default]
    Tenant,
    /// Acts as the app itself
    App,
}

impl TokenKind {
    /// Path of the self-built-app issuance endpoint
    pub fn issue_path(self) -> &'static str {
        match self {
            Self::Tenant => "/open-apis/auth/v3/tenant_access_token/internal",
            Self::App => "/open-apis/auth/v3/app_access_token/internal",
        }
    }
}

/// Body sent to the issuance endpoint
#[derive(Debug, Serialize)]
pub(crate) struct IssueTokenRequest<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

impl<'a> From<&'a AppIdentity> for IssueTokenRequest<'a> {
    fn from(identity: &'a AppIdentity) -> Self {
        Self {
            app_id: &identity.app_id,
            app_secret: &identity.app_secret,
        }
    }
}

/// Response from the issuance endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct IssueTokenResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub tenant_access_token: Option<String>,
    #[serde(default)]
    pub app_access_token: Option<String>,
    /// Remaining lifetime in seconds
    #[serde(default)]
    pub expire: Option<i64>,
}

impl IssueTokenResponse {
    /// Validates the envelope and extracts the token for `kind`
    pub fn into_issued(self, kind: TokenKind) -> Result<(String, Duration), CredentialError> {
        if self.code != 0 {
            return Err(CredentialError::Rejected {
                code: self.code,
                msg: self.msg,
            });
        }

        let token = match kind {
            TokenKind::Tenant => self.tenant_access_token,
            TokenKind::App => self.app_access_token,
        }
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CredentialError::Decode("response carries no access token".into()))?;

        let expire = self
            .expire
            .filter(|secs| *secs > 0)
            .ok_or_else(|| CredentialError::Decode("response carries no positive expire".into()))?;
        let lifetime = Duration::try_seconds(expire)
            .ok_or_else(|| CredentialError::Decode(format!("expire out of range: {expire}")))?;

        Ok((token, lifetime))
    }
}

/// A cached access token
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: DateTime<Utc>,
    /// Instant after which the token is no longer handed out
    refresh_at: DateTime<Utc>,
}

impl Credential {
    /// Builds a credential issued at `now` that lives for `lifetime`
    ///
    /// The margin is clamped to half the lifetime, so a token whose whole
    /// lifetime is shorter than the margin is still usable once. Fails if the
    /// expiry instant is not representable.
    pub fn issued(
        token: String,
        now: DateTime<Utc>,
        lifetime: Duration,
        margin: Duration,
    ) -> Result<Self, CredentialError> {
        let margin = margin.min(lifetime / 2);
        let expires_at = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| CredentialError::Decode("expire out of range".into()))?;
        Ok(Self {
            token,
            expires_at,
            refresh_at: expires_at - margin,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true while the token may still be handed out at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.refresh_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("refresh_at", &self.refresh_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    // === Credential tests ===

    #[test]
    fn credential_usable_until_margin() {
        let cred = Credential::issued("t".into(), t0(), Duration::hours(2), Duration::minutes(5))
            .unwrap();

        assert!(cred.is_usable_at(t0()));
        assert!(cred.is_usable_at(t0() + Duration::minutes(114)));
        assert!(!cred.is_usable_at(t0() + Duration::minutes(115)));
        assert!(!cred.is_usable_at(t0() + Duration::hours(3)));
        assert_eq!(cred.expires_at(), t0() + Duration::hours(2));
    }

    #[test]
    fn credential_margin_clamped_for_short_lifetime() {
        let cred = Credential::issued("t".into(), t0(), Duration::seconds(60), Duration::minutes(5))
            .unwrap();

        assert!(cred.is_usable_at(t0()));
        assert!(cred.is_usable_at(t0() + Duration::seconds(29)));
        assert!(!cred.is_usable_at(t0() + Duration::seconds(30)));
    }

    #[test]
    fn credential_with_unrepresentable_expiry_is_decode_error() {
        let lifetime = Duration::try_seconds(10_000_000_000_000).unwrap();
        let err = Credential::issued("t".into(), t0(), lifetime, Duration::minutes(5)).unwrap_err();
        assert!(matches!(err, CredentialError::Decode(_)));
    }

    #[test]
    fn credential_debug_hides_token() {
        let cred = Credential::issued("t-secret".into(), t0(), Duration::hours(2), Duration::zero())
            .unwrap();
        assert!(!format!("{cred:?}").contains("t-secret"));
    }

    #[test]
    fn identity_debug_hides_secret() {
        let identity = AppIdentity::new("cli_123", "s3cr3t");
        let debug = format!("{identity:?}");
        assert!(debug.contains("cli_123"));
        assert!(!debug.contains("s3cr3t"));
    }

    // === Issuance wire format ===

    #[test]
    fn issue_request_serializes_identity() {
        let identity = AppIdentity::new("cli_123", "s3cr3t");
        let body = serde_json::to_value(IssueTokenRequest::from(&identity)).unwrap();
        assert_eq!(body, serde_json::json!({"app_id": "cli_123", "app_secret": "s3cr3t"}));
    }

    #[test]
    fn issue_response_tenant_token() {
        let json = r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":7200}"#;
        let resp: IssueTokenResponse = serde_json::from_str(json).unwrap();

        let (token, lifetime) = resp.into_issued(TokenKind::Tenant).unwrap();
        assert_eq!(token, "t-abc");
        assert_eq!(lifetime, Duration::hours(2));
    }

    #[test]
    fn issue_response_app_token() {
        let json = r#"{"code":0,"msg":"ok","app_access_token":"a-abc","expire":100}"#;
        let resp: IssueTokenResponse = serde_json::from_str(json).unwrap();

        let (token, _) = resp.into_issued(TokenKind::App).unwrap();
        assert_eq!(token, "a-abc");
    }

    #[test]
    fn issue_response_nonzero_code_is_rejection() {
        let json = r#"{"code":10014,"msg":"app secret invalid"}"#;
        let resp: IssueTokenResponse = serde_json::from_str(json).unwrap();

        assert_eq!(
            resp.into_issued(TokenKind::Tenant).unwrap_err(),
            CredentialError::Rejected {
                code: 10014,
                msg: "app secret invalid".into()
            }
        );
    }

    #[test]
    fn issue_response_wrong_kind_is_decode_error() {
        let json = r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":7200}"#;
        let resp: IssueTokenResponse = serde_json::from_str(json).unwrap();

        assert!(matches!(
            resp.into_issued(TokenKind::App),
            Err(CredentialError::Decode(_))
        ));
    }

    #[test]
    fn issue_response_missing_expire_is_decode_error() {
        let json = r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc"}"#;
        let resp: IssueTokenResponse = serde_json::from_str(json).unwrap();

        assert!(matches!(
            resp.into_issued(TokenKind::Tenant),
            Err(CredentialError::Decode(_))
        ));
    }

    #[test]
    fn issue_response_huge_expire_is_decode_error() {
        let json = format!(
            r#"{{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":{}}}"#,
            i64::MAX
        );
        let resp: IssueTokenResponse = serde_json::from_str(&json).unwrap();

        assert!(matches!(
            resp.into_issued(TokenKind::Tenant),
            Err(CredentialError::Decode(_))
        ));
    }

    #[test]
    fn token_kind_paths() {
        assert_eq!(
            TokenKind::Tenant.issue_path(),
            "/open-apis/auth/v3/tenant_access_token/internal"
        );
        assert_eq!(
            TokenKind::App.issue_path(),
            "/open-apis/auth/v3/app_access_token/internal"
        );
    }
}
