//! Service account authentication (OAuth 2.0 JWT bearer grant).
//!
//! A signed RS256 assertion is exchanged for an access token at the key's
//! `token_uri`. Tokens are cached and refreshed a minute before they expire.

use std::path::Path;

use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tokio::sync::Mutex;
use tracing::debug;

use crate::app::{QuireError, Result};
use crate::drive::api::{error_message, TokenResponse};

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.readonly",
    "https://www.googleapis.com/auth/documents.readonly",
    "https://www.googleapis.com/auth/drive.activity.readonly",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// The fields of a service account JSON key that the token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read(path).map_err(|e| {
            QuireError::Auth(format!(
                "Failed to read service account key {}: {e}",
                path.display()
            ))
        })?;
        Ok(serde_json::from_slice(&content)?)
    }
}

/// Load RSA private key from PEM (PKCS#8 first, then PKCS#1).
pub fn load_private_key(pem: &str) -> Result<RsaPrivateKey> {
    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(key);
    }

    RsaPrivateKey::from_pkcs1_pem(pem)
        .map_err(|e| QuireError::Auth(format!("Failed to parse private key: {e}")))
}

#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

pub struct TokenProvider {
    client: Client,
    client_email: String,
    token_uri: String,
    signing_key: SigningKey<Sha256>,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(key: ServiceAccountKey, client: Client) -> Result<Self> {
        let private_key = load_private_key(&key.private_key)?;
        Ok(Self {
            client,
            client_email: key.client_email,
            token_uri: key.token_uri,
            signing_key: SigningKey::<Sha256>::new(private_key),
            cached: Mutex::new(None),
        })
    }

    /// A valid access token, exchanging a fresh assertion when needed.
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(token.token.clone());
            }
        }

        debug!(account = %self.client_email, "Requesting access token");
        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<AccessToken> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT)
            .append_pair("assertion", &self.assertion(now)?)
            .finish();

        let response = self
            .client
            .post(&self.token_uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(QuireError::Auth(format!(
                "Token exchange failed ({status}): {}",
                error_message(&bytes)
            )));
        }

        let token: TokenResponse = serde_json::from_slice(&bytes)?;
        Ok(AccessToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }

    /// `base64url(header).base64url(claims).base64url(signature)`
    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let header = Header {
            alg: "RS256",
            typ: "JWT",
        };
        let claims = Claims {
            iss: self.client_email.clone(),
            scope: SCOPES.join(" "),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let signing_input = format!(
            "{}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let signature = self.signing_key.sign(signing_input.as_bytes());

        Ok(format!(
            "{signing_input}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }
}
