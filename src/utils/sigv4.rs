// AWS Signature Version 4 request signing.
//
// Used by the DynamoDB and S3 gateways: header signing for API calls and
// query-string signing for presigned S3 GET URLs. HMAC via `ring`, digests
// via `sha2`.

use chrono::{DateTime, Utc};
use ring::hmac;
use sha2::{Digest, Sha256};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// One request to be signed. `headers` must already contain `host` and
/// `x-amz-date`; names are lowercased by the signer.
pub struct SigningRequest<'a> {
    pub method: &'a str,
    /// URI path, already percent-encoded.
    pub path: &'a str,
    /// Canonical (sorted, encoded) query string, possibly empty.
    pub query: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    /// Hex SHA-256 of the payload, or [`UNSIGNED_PAYLOAD`].
    pub payload_hash: &'a str,
}

pub fn sha256_hex(data: &[u8]) -> String {
    to_hex(&Sha256::digest(data))
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&key, data).as_ref().to_vec()
}

/// Percent-encodes per the SigV4 rules: everything except unreserved
/// characters, with `/` optionally left intact for URI paths.
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn amz_date(now: &DateTime<Utc>) -> (String, String) {
    (
        now.format("%Y%m%dT%H%M%SZ").to_string(),
        now.format("%Y%m%d").to_string(),
    )
}

fn credential_scope(datestamp: &str, region: &str, service: &str) -> String {
    format!("{}/{}/{}/aws4_request", datestamp, region, service)
}

/// The HMAC key chain: date, region, service, terminal string.
fn signing_key(secret: &str, datestamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), datestamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn canonical_headers(headers: &[(&str, &str)]) -> (String, String) {
    let mut pairs: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    pairs.sort();

    let canonical = pairs
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect::<String>();
    let signed = pairs
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (canonical, signed)
}

fn string_to_sign(amzdate: &str, scope: &str, canonical_request: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amzdate,
        scope,
        sha256_hex(canonical_request.as_bytes())
    )
}

/// Computes the `Authorization` header value for a request.
pub fn sign_request(
    credentials: &Credentials,
    region: &str,
    service: &str,
    request: &SigningRequest<'_>,
    now: &DateTime<Utc>,
) -> String {
    let (amzdate, datestamp) = amz_date(now);
    let (canonical_headers, signed_headers) = canonical_headers(request.headers);

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method,
        request.path,
        request.query,
        canonical_headers,
        signed_headers,
        request.payload_hash
    );

    let scope = credential_scope(&datestamp, region, service);
    let to_sign = string_to_sign(&amzdate, &scope, &canonical_request);
    let key = signing_key(&credentials.secret_access_key, &datestamp, region, service);
    let signature = to_hex(&hmac_sha256(&key, to_sign.as_bytes()));

    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
    )
}

/// Builds a presigned GET URL (used for image links in responses).
pub fn presign_get_url(
    credentials: &Credentials,
    region: &str,
    service: &str,
    host: &str,
    path: &str,
    expires_secs: u64,
    now: &DateTime<Utc>,
) -> String {
    let (amzdate, datestamp) = amz_date(now);
    let scope = credential_scope(&datestamp, region, service);
    let credential = format!("{}/{}", credentials.access_key_id, scope);

    // Sorted query parameters, all values encoded.
    let mut query_pairs = vec![
        ("X-Amz-Algorithm", ALGORITHM.to_string()),
        ("X-Amz-Credential", credential),
        ("X-Amz-Date", amzdate.clone()),
        ("X-Amz-Expires", expires_secs.to_string()),
        ("X-Amz-SignedHeaders", "host".to_string()),
    ];
    query_pairs.sort();
    let query = query_pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, uri_encode(value, true)))
        .collect::<Vec<_>>()
        .join("&");

    let encoded_path = uri_encode(path, false);
    let canonical_request = format!(
        "GET\n{}\n{}\nhost:{}\n\nhost\n{}",
        encoded_path, query, host, UNSIGNED_PAYLOAD
    );

    let to_sign = string_to_sign(&amzdate, &scope, &canonical_request);
    let key = signing_key(&credentials.secret_access_key, &datestamp, region, service);
    let signature = to_hex(&hmac_sha256(&key, to_sign.as_bytes()));

    format!(
        "https://{}{}?{}&X-Amz-Signature={}",
        host, encoded_path, query, signature
    )
}
