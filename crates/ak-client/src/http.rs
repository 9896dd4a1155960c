use crate::{ClientError, ClientResult};

use std::panic::Location;

use error_location::ErrorLocation;
use parking_lot::RwLock;
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde_json::Value;

/// HTTP client for the hosted backend REST API.
///
/// Every request carries the project `apikey`; requests made while a
/// session is active additionally authenticate as that user. No timeouts
/// beyond reqwest defaults and no retries - failures surface to the caller.
pub struct Client {
    base_url: String,
    anon_key: String,
    bearer: RwLock<Option<String>>,
    http: ReqwestClient,
}

impl Client {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Backend project URL (e.g., "https://abcd.example.co")
    /// * `anon_key` - Public API key sent with every request
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            bearer: RwLock::new(None),
            http: ReqwestClient::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install (or clear) the user access token used for authenticated
    /// requests. Owned by the auth layer; everything else only reads it.
    pub fn set_bearer(&self, token: Option<String>) {
        *self.bearer.write() = token;
    }

    /// Build a request with the api key and the current authorization
    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let bearer = self
            .bearer
            .read()
            .clone()
            .unwrap_or_else(|| self.anon_key.clone());

        self.http
            .request(method, &url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Execute request and map non-success responses to API errors
    pub(crate) async fn execute(&self, req: reqwest::RequestBuilder) -> ClientResult<Value> {
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let body: Value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(body)
    }
}

/// Extract a structured error from a failed response.
///
/// The auth and table endpoints use different envelopes; probe the known
/// shapes and fall back to the HTTP status. The message is preserved
/// verbatim for pass-through to callers.
#[track_caller]
fn api_error(status: StatusCode, body: &Value) -> ClientError {
    let code = body
        .get("code")
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .or_else(|| str_field(body, "error_code"))
        .or_else(|| str_field(body, "error"))
        .unwrap_or_else(|| status.as_u16().to_string());

    let message = str_field(body, "message")
        .or_else(|| str_field(body, "msg"))
        .or_else(|| str_field(body, "error_description"))
        .unwrap_or_else(|| format!("request failed with status {status}"));

    ClientError::Api {
        code,
        message,
        location: ErrorLocation::from(Location::caller()),
    }
}

fn str_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(|v| v.as_str()).map(String::from)
}
