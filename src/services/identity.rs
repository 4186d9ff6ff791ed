// Identity provider gateway (AWS Cognito user-pool client API).
//
// Pure pass-through: every operation maps to one `cognito-idp` call.
// Input validation (email format, password policy, code length) happens
// in the handlers before reaching this component.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("identity provider request failed: {0}")]
    Request(String),

    /// The provider rejected the operation (wrong code, unknown user, ...).
    #[error("{message}")]
    Provider { code: String, message: String },

    #[error("unexpected identity provider response: {0}")]
    Decode(String),
}

/// Tokens issued by the provider on a successful login.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Registers the credentials and returns the provider subject id.
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError>;
    async fn confirm_email(&self, email: &str, code: &str) -> Result<(), IdentityError>;
    async fn forgot_password(&self, email: &str) -> Result<(), IdentityError>;
    async fn change_password(
        &self,
        email: &str,
        new_password: &str,
        code: &str,
    ) -> Result<(), IdentityError>;
    async fn login(&self, login: &str, password: &str) -> Result<AuthTokens, IdentityError>;
}

pub struct CognitoIdentityGateway {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
}

impl CognitoIdentityGateway {
    pub fn new(
        http: reqwest::Client,
        region: &str,
        client_id: &str,
        endpoint_override: Option<&str>,
    ) -> Self {
        let endpoint = endpoint_override
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", region));
        CognitoIdentityGateway {
            http,
            endpoint,
            client_id: client_id.to_string(),
        }
    }

    /// The user-pool client operations are unauthenticated; only the
    /// `X-Amz-Target` header selects the call.
    async fn call(&self, operation: &str, payload: Value) -> Result<Value, IdentityError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-target", format!("{}.{}", TARGET_PREFIX, operation))
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status();
        let value: Value = response
            .json()
            .await
            .map_err(|e| IdentityError::Decode(e.to_string()))?;

        if !status.is_success() {
            let code = value["__type"].as_str().unwrap_or("UnknownError").to_string();
            let message = value["message"]
                .as_str()
                .or_else(|| value["Message"].as_str())
                .unwrap_or("erro desconhecido")
                .to_string();
            tracing::warn!(operation, code = %code, "identity provider rejected call");
            return Err(IdentityError::Provider { code, message });
        }

        Ok(value)
    }
}

#[async_trait]
impl IdentityGateway for CognitoIdentityGateway {
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let response = self
            .call(
                "SignUp",
                json!({
                    "ClientId": self.client_id,
                    "Username": email,
                    "Password": password,
                }),
            )
            .await?;
        response["UserSub"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| IdentityError::Decode("SignUp response missing UserSub".to_string()))
    }

    async fn confirm_email(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        self.call(
            "ConfirmSignUp",
            json!({
                "ClientId": self.client_id,
                "Username": email,
                "ConfirmationCode": code,
            }),
        )
        .await?;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), IdentityError> {
        self.call(
            "ForgotPassword",
            json!({
                "ClientId": self.client_id,
                "Username": email,
            }),
        )
        .await?;
        Ok(())
    }

    async fn change_password(
        &self,
        email: &str,
        new_password: &str,
        code: &str,
    ) -> Result<(), IdentityError> {
        self.call(
            "ConfirmForgotPassword",
            json!({
                "ClientId": self.client_id,
                "Username": email,
                "ConfirmationCode": code,
                "Password": new_password,
            }),
        )
        .await?;
        Ok(())
    }

    async fn login(&self, login: &str, password: &str) -> Result<AuthTokens, IdentityError> {
        let response = self
            .call(
                "InitiateAuth",
                json!({
                    "ClientId": self.client_id,
                    "AuthFlow": "USER_PASSWORD_AUTH",
                    "AuthParameters": {
                        "USERNAME": login,
                        "PASSWORD": password,
                    },
                }),
            )
            .await?;

        let result = &response["AuthenticationResult"];
        let access_token = result["AccessToken"].as_str();
        let refresh_token = result["RefreshToken"].as_str();
        match (access_token, refresh_token) {
            (Some(access), Some(refresh)) => Ok(AuthTokens {
                access_token: access.to_string(),
                refresh_token: refresh.to_string(),
            }),
            _ => Err(IdentityError::Decode(
                "InitiateAuth response missing tokens".to_string(),
            )),
        }
    }
}
