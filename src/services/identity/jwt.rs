//! Identity provider backed by the hosted auth service's session JWT.
//!
//! The hosted provider issues the token and sets it as a cookie; we only verify it
//! locally (signature, `iss`, `aud`, `exp` with leeway) and read the claims we route on.
//! No database lookup happens here: the role travels with the session claim.

use std::fmt;

use async_trait::async_trait;
use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

use crate::config::TokenKey;
use crate::services::access::Role;
use crate::services::identity::provider::{IdentityError, IdentityProvider, Principal};
use crate::services::identity::session::session_token;

#[derive(Debug, thiserror::Error)]
pub enum SessionTokenError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),
}

/// Session token claims, as issued by the hosted auth provider.
///
/// `app_metadata` is only writable by the provider's admin API, so it is the
/// authoritative place for the role. `user_metadata` is the signup-time fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    pub iss: String,
    pub sub: String,
    pub exp: u64,

    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,

    #[serde(default)]
    pub app_metadata: Value,
    #[serde(default)]
    pub user_metadata: Value,
}

impl SessionClaims {
    fn role_claim(&self) -> Option<&str> {
        self.app_metadata
            .get("role")
            .and_then(Value::as_str)
            .or_else(|| self.user_metadata.get("role").and_then(Value::as_str))
            .filter(|r| !r.trim().is_empty())
    }

    fn is_verified(&self) -> bool {
        self.email_confirmed_at.is_some()
            || self
                .user_metadata
                .get("email_verified")
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }

    fn into_principal(self) -> Principal {
        let role = match self.role_claim() {
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(err) => {
                    tracing::warn!(sub = %self.sub, error = %err, "ignoring unrecognised role claim");
                    None
                }
            },
            None => None,
        };

        let verified = self.is_verified();

        Principal {
            id: self.sub,
            email: self.email.filter(|e| !e.trim().is_empty()),
            role,
            verified,
        }
    }
}

/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
}

impl fmt::Debug for JwtIdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtIdentityProvider")
            .field("validation", &self.validation)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

impl JwtIdentityProvider {
    pub fn new(
        key: &TokenKey,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
        cookie_name: impl Into<String>,
    ) -> Result<Self, String> {
        let (decoding_key, algorithm) = match key {
            TokenKey::Secret(secret) => (
                DecodingKey::from_secret(secret.as_bytes()),
                Algorithm::HS256,
            ),
            TokenKey::EdPublicPem(pem) => (
                DecodingKey::from_ed_pem(pem.as_bytes())
                    .map_err(|e| format!("invalid ed25519 public key pem: {}", e))?,
                Algorithm::EdDSA,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
            cookie_name: cookie_name.into(),
        })
    }

    /// Verify signature + registered claims, then require a usable subject.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        let data =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(SessionTokenError::EmptyClaim("sub"));
        }
        if claims.iss.trim().is_empty() {
            return Err(SessionTokenError::EmptyClaim("iss"));
        }

        Ok(claims)
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn current_principal(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<Principal>, IdentityError> {
        let Some(token) = session_token(headers, &self.cookie_name) else {
            return Ok(None);
        };

        match self.verify(token) {
            Ok(claims) => Ok(Some(claims.into_principal())),
            Err(err) => {
                // An expired or forged session is "no session", not an upstream failure.
                tracing::warn!(error = %err, "session token verification failed");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-jwt-secret";
    const ISSUER: &str = "https://auth.example.test/auth/v1";
    const AUDIENCE: &str = "authenticated";

    fn provider() -> JwtIdentityProvider {
        JwtIdentityProvider::new(
            &TokenKey::Secret(SECRET.to_string()),
            ISSUER,
            AUDIENCE,
            0,
            "sb-access-token",
        )
        .unwrap()
    }

    fn mint(claims: serde_json::Value, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn base_claims() -> serde_json::Value {
        json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": "3f1c2b9e-0000-4000-8000-000000000001",
            "exp": chrono::Utc::now().timestamp() + 600,
            "email": "singer@example.test",
            "role": "authenticated",
        })
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("sb-access-token={token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn no_token_means_no_principal() {
        let got = provider().current_principal(&HeaderMap::new()).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn decodes_role_from_app_metadata() {
        let mut claims = base_claims();
        claims["app_metadata"] = json!({ "role": "editor" });
        claims["user_metadata"] = json!({ "role": "customer" });
        let token = mint(claims, SECRET);

        let principal = provider()
            .current_principal(&cookie_headers(&token))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(principal.role, Some(Role::Editor));
        assert_eq!(principal.email.as_deref(), Some("singer@example.test"));
        assert_eq!(principal.id, "3f1c2b9e-0000-4000-8000-000000000001");
    }

    #[tokio::test]
    async fn falls_back_to_user_metadata_role() {
        let mut claims = base_claims();
        claims["user_metadata"] = json!({ "role": "artist", "email_verified": true });
        let token = mint(claims, SECRET);

        let principal = provider()
            .current_principal(&cookie_headers(&token))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(principal.role, Some(Role::Artist));
        assert!(principal.verified);
    }

    #[tokio::test]
    async fn unknown_or_missing_role_leaves_role_empty() {
        let mut claims = base_claims();
        claims["app_metadata"] = json!({ "role": "superuser" });
        let token = mint(claims, SECRET);
        let principal = provider()
            .current_principal(&cookie_headers(&token))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(principal.role, None);

        let token = mint(base_claims(), SECRET);
        let principal = provider()
            .current_principal(&cookie_headers(&token))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(principal.role, None);
        assert!(!principal.verified);
    }

    #[tokio::test]
    async fn wrong_signature_is_treated_as_no_session() {
        let token = mint(base_claims(), "some-other-secret");
        let got = provider().current_principal(&cookie_headers(&token)).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn expired_token_is_treated_as_no_session() {
        let mut claims = base_claims();
        claims["exp"] = json!(chrono::Utc::now().timestamp() - 3600);
        let token = mint(claims, SECRET);
        let got = provider().current_principal(&cookie_headers(&token)).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let mut claims = base_claims();
        claims["aud"] = json!("service_role");
        let token = mint(claims, SECRET);
        let got = provider().current_principal(&cookie_headers(&token)).await.unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn debug_output_hides_key_material() {
        let out = format!("{:?}", provider());
        assert!(!out.contains(SECRET));
    }
}
