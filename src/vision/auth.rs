//! OAuth2 access token minting via the service account signed-JWT grant.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::credentials::{self, ServiceAccountKey};
use crate::vision::error::OcrError;

/// OAuth2 scope covering the Vision API.
const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
/// Token lifetime requested in the grant, the maximum Google allows.
const TOKEN_TTL_SECS: i64 = 3600;
/// Mint a replacement this long before the cached token expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct GrantClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Mints and caches bearer tokens for the service account.
///
/// The key file is re-read on every mint, so rotated credentials are
/// picked up without a restart. All failures surface as [`OcrError::Auth`].
pub struct TokenSource {
    credentials_path: String,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(credentials_path: String, http: reqwest::Client) -> Self {
        Self {
            credentials_path,
            http,
            cached: Mutex::new(None),
        }
    }

    /// A bearer token for the Vision API, minted fresh when the cache is
    /// empty or inside the expiry margin.
    pub async fn token(&self) -> Result<String, OcrError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) < entry.expires_at {
                return Ok(entry.token.clone());
            }
        }

        let key = credentials::load(&self.credentials_path)
            .map_err(|e| OcrError::Auth(e.to_string()))?;
        let fresh = self.mint(&key).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn mint(&self, key: &ServiceAccountKey) -> Result<CachedToken, OcrError> {
        let now = Utc::now();
        let claims = GrantClaims {
            iss: key.client_email.clone(),
            scope: SCOPE.to_string(),
            aud: key.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        };

        let signer = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| OcrError::Auth(format!("invalid private key in credentials file: {e}")))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signer)
            .map_err(|e| OcrError::Auth(format!("failed to sign token grant: {e}")))?;

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| OcrError::Auth(format!("token endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Auth(format!(
                "token grant rejected ({status}): {body}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Auth(format!("malformed token response: {e}")))?;

        Ok(CachedToken {
            expires_at: now + Duration::seconds(body.expires_in),
            token: body.access_token,
        })
    }
}
