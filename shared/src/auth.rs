//! Google service account authentication.
//!
//! Access tokens are obtained with the JWT bearer grant: an RS256 assertion
//! signed with the account's private key is exchanged at the token endpoint.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{Error, Result};

/// OAuth2 scope for reading and writing spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Default token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens this close to expiry are refreshed.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Service account key material.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Claims of the signed assertion.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AssertionClaims {
    /// Issuer (service account email)
    pub iss: String,
    /// Space-separated scopes
    pub scope: String,
    /// Audience (token endpoint)
    pub aud: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(credentials: &ServiceAccountCredentials, scope: &str, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: credentials.client_email.clone(),
            scope: scope.to_string(),
            aud: credentials.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Issues and caches access tokens for one service account.
///
/// Built once per container and shared by every request.
pub struct ServiceAccountTokenProvider {
    http_client: reqwest::Client,
    credentials: ServiceAccountCredentials,
    encoding_key: EncodingKey,
    scope: String,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    /// Create a provider; fails if the private key is not a valid RSA PEM.
    pub fn new(
        http_client: reqwest::Client,
        credentials: ServiceAccountCredentials,
        scope: impl Into<String>,
    ) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
            .map_err(|e| Error::Auth(format!("Invalid service account private key: {}", e)))?;

        Ok(Self {
            http_client,
            credentials,
            encoding_key,
            scope: scope.into(),
            cached: RwLock::new(None),
        })
    }

    /// Current access token, fetching a new one when needed.
    pub async fn access_token(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.access_token.clone());
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims::new(&self.credentials, &self.scope, now);
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Auth(format!("Failed to sign assertion: {}", e)))
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        debug!(issuer = %self.credentials.client_email, "Requesting Sheets access token");

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "Token request failed ({}): {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Failed to parse token response: {}", e)))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS)),
        })
    }
}
