use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use url::Url;

use crate::services::storage::issuer::{SignedUrlIssuer, StorageError};

#[derive(Serialize)]
struct SignedObjectClaims {
    // "<bucket>/<object key>"
    url: String,
    iat: i64,
    exp: i64,
}

/// Signs object URLs the way the hosted storage service verifies them:
/// `GET <base>/storage/v1/object/sign/<bucket>/<key>?token=<HS256 JWT>`.
///
/// The token binds the exact object and an expiry; the storage service rejects
/// it after `exp`.
#[derive(Clone)]
pub struct StorageUrlSigner {
    base_url: Url,
    bucket: String,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for StorageUrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("StorageUrlSigner")
            .field("base_url", &self.base_url.as_str())
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl StorageUrlSigner {
    pub fn new(base_url: &str, bucket: &str, signing_secret: &str) -> Result<Self, StorageError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StorageError::Backend(format!("invalid storage base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::Backend(
                "storage base url cannot be a base".to_string(),
            ));
        }
        if bucket.trim().is_empty() || bucket.contains('/') {
            return Err(StorageError::Backend(format!("invalid bucket name: {bucket}")));
        }

        Ok(Self {
            base_url,
            bucket: bucket.to_string(),
            encoding_key: EncodingKey::from_secret(signing_secret.as_bytes()),
        })
    }

    /// Normalise a requested artifact location into an object key inside the bucket.
    ///
    /// Accepts a bare key (`songs/a.mp3`) or a public object URL of this bucket.
    fn object_key(&self, path: &str) -> Result<String, StorageError> {
        let key = if path.contains("://") {
            let public_prefix = format!(
                "{}/storage/v1/object/public/{}/",
                self.base_url.as_str().trim_end_matches('/'),
                self.bucket
            );
            path.strip_prefix(&public_prefix)
                .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?
        } else {
            path
        };

        if key.is_empty() || key.starts_with('/') {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        if key
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..")
        {
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        Ok(key.to_string())
    }

    fn sign_token(&self, key: &str, expires_in_secs: u64) -> Result<String, StorageError> {
        let iat = chrono::Utc::now().timestamp();
        let ttl = i64::try_from(expires_in_secs)
            .map_err(|_| StorageError::Signing("expiry out of range".to_string()))?;

        let claims = SignedObjectClaims {
            url: format!("{}/{}", self.bucket, key),
            iat,
            exp: iat + ttl,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| StorageError::Signing(e.to_string()))
    }
}

#[async_trait]
impl SignedUrlIssuer for StorageUrlSigner {
    async fn create_signed_url(
        &self,
        path: &str,
        expires_in_secs: u64,
    ) -> Result<String, StorageError> {
        let key = self.object_key(path)?;
        let token = self.sign_token(&key, expires_in_secs)?;

        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::Backend("storage base url cannot be a base".into()))?;
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object", "sign", self.bucket.as_str()])
                .extend(key.split('/'));
        }
        url.query_pairs_mut().append_pair("token", &token);

        Ok(url.into())
    }
}
