// Centralized configuration: every environment value is read once at
// startup into an explicit struct carried by the application state.
// Missing required values fail fast, all names listed in one error.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ENVs para serviço não encontradas: {}", .0.join(", "))]
    MissingVars(Vec<String>),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub environment: Environment,

    // Identity provider
    pub user_pool_id: String,
    pub user_pool_client_id: String,

    // Document store tables
    pub user_table: String,
    pub post_table: String,

    // Blob store buckets
    pub avatar_bucket: String,
    pub post_bucket: String,

    // AWS access
    pub aws_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,

    // Endpoint overrides for local stacks (None in production)
    pub dynamodb_endpoint: Option<String>,
    pub cognito_endpoint: Option<String>,
    pub s3_endpoint: Option<String>,
    pub token_issuer: Option<String>,

    // Pagination and presigning
    pub feed_page_size: u32,
    pub search_page_size: u32,
    pub presign_expiry_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" => Environment::Staging,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Names that must be present; the startup failure lists them all.
const REQUIRED_VARS: &[&str] = &[
    "USER_POOL_ID",
    "USER_POOL_CLIENT_ID",
    "USER_TABLE",
    "POST_TABLE",
    "AVATAR_BUCKET",
    "POST_BUCKET",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
];

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|name| env::var(name).map(|v| v.trim().is_empty()).unwrap_or(true))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }

        Ok(AppConfig {
            bind_address: env_or("BIND_ADDRESS", "0.0.0.0:8080"),
            environment: Environment::from(env_or("ENVIRONMENT", "development")),

            user_pool_id: env::var("USER_POOL_ID").unwrap(),
            user_pool_client_id: env::var("USER_POOL_CLIENT_ID").unwrap(),
            user_table: env::var("USER_TABLE").unwrap(),
            post_table: env::var("POST_TABLE").unwrap(),
            avatar_bucket: env::var("AVATAR_BUCKET").unwrap(),
            post_bucket: env::var("POST_BUCKET").unwrap(),

            aws_region: env_or("AWS_REGION", "us-east-1"),
            aws_access_key_id: env::var("AWS_ACCESS_KEY_ID").unwrap(),
            aws_secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").unwrap(),

            dynamodb_endpoint: env::var("DYNAMODB_ENDPOINT").ok(),
            cognito_endpoint: env::var("COGNITO_ENDPOINT").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            token_issuer: env::var("TOKEN_ISSUER").ok(),

            feed_page_size: parse_or("FEED_PAGE_SIZE", 20)?,
            search_page_size: parse_or("SEARCH_PAGE_SIZE", 5)?,
            presign_expiry_secs: parse_or("PRESIGN_EXPIRY_SECS", 3600)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}
