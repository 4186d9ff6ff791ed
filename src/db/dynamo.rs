// Thin DynamoDB JSON-protocol client (`DynamoDB_20120810`), SigV4-signed.
// Only the five operations the repositories need: GetItem, PutItem,
// UpdateItem, Query and Scan.

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::db::StoreError;
use crate::utils::sigv4::{self, Credentials, SigningRequest};

const SERVICE: &str = "dynamodb";
const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// A DynamoDB item: attribute name to typed attribute value.
pub type Item = Map<String, Value>;

pub fn attr_s(value: &str) -> Value {
    json!({ "S": value })
}

pub fn attr_n(value: i64) -> Value {
    // numbers travel as strings on the wire
    json!({ "N": value.to_string() })
}

/// String set attribute. DynamoDB rejects empty sets, so `None` is
/// returned for an empty slice and the attribute must be omitted.
pub fn attr_ss(values: &[String]) -> Option<Value> {
    if values.is_empty() {
        None
    } else {
        Some(json!({ "SS": values }))
    }
}

pub fn get_s(item: &Item, name: &str) -> Option<String> {
    item.get(name)?.get("S")?.as_str().map(str::to_string)
}

pub fn get_n(item: &Item, name: &str) -> Option<i64> {
    item.get(name)?.get("N")?.as_str()?.parse().ok()
}

pub fn get_ss(item: &Item, name: &str) -> Vec<String> {
    item.get(name)
        .and_then(|attr| attr.get("SS"))
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub struct DynamoClient {
    http: reqwest::Client,
    endpoint: String,
    host: String,
    region: String,
    credentials: Credentials,
}

impl DynamoClient {
    pub fn new(
        http: reqwest::Client,
        region: &str,
        credentials: Credentials,
        endpoint_override: Option<&str>,
    ) -> Self {
        let endpoint = endpoint_override
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://dynamodb.{}.amazonaws.com", region));
        let host = endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();

        DynamoClient {
            http,
            endpoint,
            host,
            region: region.to_string(),
            credentials,
        }
    }

    /// Sends one signed operation, e.g. `call("GetItem", payload)`.
    pub async fn call(&self, operation: &str, payload: Value) -> Result<Value, StoreError> {
        let body = payload.to_string();
        let now = Utc::now();
        let amzdate = now.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = sigv4::sha256_hex(body.as_bytes());
        let target = format!("DynamoDB_20120810.{}", operation);

        let headers = [
            ("content-type", CONTENT_TYPE),
            ("host", self.host.as_str()),
            ("x-amz-date", amzdate.as_str()),
            ("x-amz-target", target.as_str()),
        ];
        let authorization = sigv4::sign_request(
            &self.credentials,
            &self.region,
            SERVICE,
            &SigningRequest {
                method: "POST",
                path: "/",
                query: "",
                headers: &headers,
                payload_hash: &payload_hash,
            },
            &now,
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-date", amzdate)
            .header("x-amz-target", target)
            .header("authorization", authorization)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status();
        let value: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !status.is_success() {
            let code = value["__type"].as_str().unwrap_or("UnknownError");
            if code.ends_with("ConditionalCheckFailedException") {
                return Err(StoreError::ConditionFailed);
            }
            let message = value["message"]
                .as_str()
                .or_else(|| value["Message"].as_str())
                .unwrap_or("");
            tracing::warn!(operation, code, message, "DynamoDB call failed");
            return Err(StoreError::Request(format!("{}: {}", code, message)));
        }

        Ok(value)
    }
}

/// Extracts the `Item` object from a GetItem response, if present.
pub fn response_item(response: &Value) -> Option<&Item> {
    response.get("Item")?.as_object()
}

/// Extracts `Items` and `LastEvaluatedKey` from a Query/Scan response.
pub fn response_page(response: &Value) -> (Vec<Item>, Option<Value>) {
    let items = response
        .get("Items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    let last_key = response.get("LastEvaluatedKey").filter(|v| !v.is_null()).cloned();
    (items, last_key)
}
