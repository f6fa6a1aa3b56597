//! Presigned upload URLs for product images.
//!
//! Image bytes never pass through this service: the API hands the client a
//! short-lived presigned `PUT` URL against S3-compatible object storage and
//! the durable public URL the object will be served from. Signing is SigV4
//! in query-parameter form with an unsigned payload.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::StorageConfig;

type HmacSha256 = Hmac<Sha256>;

/// Presigned URLs expire after this many seconds.
const EXPIRES_SECS: u32 = 60;

/// Region label used by R2-style S3-compatible endpoints.
const REGION: &str = "auto";

/// A presigned upload slot for one object.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SignedUpload {
    /// Where the client `PUT`s the bytes, valid for sixty seconds.
    pub url: String,
    /// Where the object will be publicly readable after upload.
    pub public_url: String,
}

/// Signs upload URLs against the configured bucket.
#[derive(Clone)]
pub struct UploadSigner {
    endpoint: String,
    host: String,
    bucket: String,
    access_key_id: String,
    secret_access_key: SecretString,
    public_domain: String,
}

impl UploadSigner {
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let host = endpoint
            .strip_prefix("https://")
            .or_else(|| endpoint.strip_prefix("http://"))
            .unwrap_or(&endpoint)
            .to_string();
        Self {
            endpoint,
            host,
            bucket: config.bucket.clone(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            public_domain: config.public_domain.trim_end_matches('/').to_string(),
        }
    }

    /// Presign a `PUT` for one object of the given content type. The object
    /// key is a fresh UUID with an extension derived from the content type.
    #[must_use]
    pub fn presign_upload(&self, content_type: &str) -> SignedUpload {
        self.presign_upload_at(content_type, Utc::now())
    }

    fn presign_upload_at(&self, content_type: &str, now: DateTime<Utc>) -> SignedUpload {
        let key = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        let date = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let scope = format!("{date}/{REGION}/s3/aws4_request");
        let credential = format!("{}/{scope}", self.access_key_id);

        // Query parameters in canonical (sorted) order.
        let query = [
            ("X-Amz-Algorithm", "AWS4-HMAC-SHA256".to_string()),
            ("X-Amz-Credential", credential),
            ("X-Amz-Date", amz_date.clone()),
            ("X-Amz-Expires", EXPIRES_SECS.to_string()),
            ("X-Amz-SignedHeaders", "content-type;host".to_string()),
        ];
        let canonical_query = query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_path = format!("/{}/{key}", self.bucket);
        let canonical_request = format!(
            "PUT\n{canonical_path}\n{canonical_query}\ncontent-type:{content_type}\nhost:{}\n\ncontent-type;host\nUNSIGNED-PAYLOAD",
            self.host
        );

        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = self.signing_key(&date);
        let signature = hex::encode(hmac(&signing_key, string_to_sign.as_bytes()));

        SignedUpload {
            url: format!(
                "{}{canonical_path}?{canonical_query}&X-Amz-Signature={signature}",
                self.endpoint
            ),
            public_url: format!("{}/{key}", self.public_domain),
        }
    }

    fn signing_key(&self, date: &str) -> Vec<u8> {
        let secret = format!("AWS4{}", self.secret_access_key.expose_secret());
        let k_date = hmac(secret.as_bytes(), date.as_bytes());
        let k_region = hmac(&k_date, REGION.as_bytes());
        let k_service = hmac(&k_region, b"s3");
        hmac(&k_service, b"aws4_request")
    }
}

impl std::fmt::Debug for UploadSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSigner")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("public_domain", &self.public_domain)
            .finish_non_exhaustive()
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key)
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// File extension for a MIME content type.
fn extension_for(content_type: &str) -> &str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/svg+xml" => "svg",
        other => other.rsplit('/').next().unwrap_or("bin"),
    }
}
