// Blob store gateway (S3): image upload with key generation and
// presigned URL resolution for responses.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::utils::sigv4::{self, Credentials, SigningRequest};

const SERVICE: &str = "s3";

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("blob store request failed: {0}")]
    Request(String),

    #[error("blob store rejected upload: status {0}")]
    UploadRejected(u16),
}

#[async_trait]
pub trait BlobGateway: Send + Sync {
    /// Uploads the file and returns the generated object key
    /// (`{prefix}-{uuid}.{ext}`).
    async fn save_image(
        &self,
        bucket: &str,
        prefix: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String, BlobError>;

    /// Resolves a stored key to a URL the client can fetch.
    async fn image_url(&self, bucket: &str, key: &str) -> Result<String, BlobError>;
}

pub struct S3BlobGateway {
    http: reqwest::Client,
    region: String,
    credentials: Credentials,
    presign_expiry_secs: u64,
    scheme: String,
    /// Virtual-hosted endpoint host override, for local stacks.
    endpoint_host: Option<String>,
}

impl S3BlobGateway {
    pub fn new(
        http: reqwest::Client,
        region: &str,
        credentials: Credentials,
        presign_expiry_secs: u64,
        endpoint_override: Option<&str>,
    ) -> Self {
        let (scheme, endpoint_host) = match endpoint_override {
            Some(endpoint) => {
                let (scheme, host) = if let Some(host) = endpoint.strip_prefix("http://") {
                    ("http", host)
                } else {
                    ("https", endpoint.trim_start_matches("https://"))
                };
                (scheme, Some(host.trim_end_matches('/').to_string()))
            }
            None => ("https", None),
        };

        S3BlobGateway {
            http,
            region: region.to_string(),
            credentials,
            presign_expiry_secs,
            scheme: scheme.to_string(),
            endpoint_host,
        }
    }

    fn bucket_host(&self, bucket: &str) -> String {
        match &self.endpoint_host {
            Some(host) => format!("{}.{}", bucket, host),
            None => format!("{}.s3.{}.amazonaws.com", bucket, self.region),
        }
    }

    fn generate_key(prefix: &str, filename: &str) -> String {
        let extension = filename.rsplit('.').next().unwrap_or("bin").to_lowercase();
        format!("{}-{}.{}", prefix, Uuid::new_v4(), extension)
    }
}

#[async_trait]
impl BlobGateway for S3BlobGateway {
    async fn save_image(
        &self,
        bucket: &str,
        prefix: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String, BlobError> {
        let key = Self::generate_key(prefix, filename);
        let host = self.bucket_host(bucket);
        let path = format!("/{}", key);
        let now = Utc::now();
        let amzdate = now.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = sigv4::sha256_hex(&content);

        let headers = [
            ("host", host.as_str()),
            ("x-amz-content-sha256", payload_hash.as_str()),
            ("x-amz-date", amzdate.as_str()),
        ];
        let authorization = sigv4::sign_request(
            &self.credentials,
            &self.region,
            SERVICE,
            &SigningRequest {
                method: "PUT",
                path: &path,
                query: "",
                headers: &headers,
                payload_hash: &payload_hash,
            },
            &now,
        );

        let response = self
            .http
            .put(format!("{}://{}{}", self.scheme, host, path))
            .header("x-amz-content-sha256", payload_hash)
            .header("x-amz-date", amzdate)
            .header("authorization", authorization)
            .body(content)
            .send()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(bucket, key = %key, status = %response.status(), "S3 upload failed");
            return Err(BlobError::UploadRejected(response.status().as_u16()));
        }

        Ok(key)
    }

    async fn image_url(&self, bucket: &str, key: &str) -> Result<String, BlobError> {
        // presigning is pure computation, no round trip
        Ok(sigv4::presign_get_url(
            &self.credentials,
            &self.region,
            SERVICE,
            &self.bucket_host(bucket),
            &format!("/{}", key),
            self.presign_expiry_secs,
            &Utc::now(),
        ))
    }
}
