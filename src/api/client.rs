use std::sync::Arc;

use reqwest::Url;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use tracker_config::Config;

use super::{
    error::extract_server_message, ApiError, ApiRequest, ApiResponse, Body, HttpTransport,
    Method, Transport,
};

/// Query parameters; `None` and empty values are left out of the URL.
pub type Query<'a> = &'a [(&'a str, Option<String>)];

/// Typed client over the invoice backend. Endpoint groups are implemented in
/// the sibling modules as inherent methods.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            token: None,
        }
    }

    /// HTTP client using the configured base URL and request timeout.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::new(config.api_base(), Arc::new(transport)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn url(&self, path: &str, query: Query<'_>) -> Result<String, ApiError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&joined)
            .map_err(|err| ApiError::Decode(format!("invalid url `{}`: {}", joined, err)))?;
        let present: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .filter(|value| !value.is_empty())
                    .map(|value| (*key, value))
            })
            .collect();
        if !present.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in present {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.to_string())
    }

    /// Executes the request and turns non-success statuses into errors.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Body,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest {
            method,
            url: self.url(path, query)?,
            bearer: self.token.clone(),
            body,
        };
        let response = self.transport.execute(&request)?;
        if response.is_success() {
            return Ok(response);
        }
        if response.status == 401 {
            warn!(url = %request.url, "request rejected as unauthorized");
            return Err(ApiError::Unauthorized);
        }
        let message = extract_server_message(&response.body);
        debug!(status = response.status, %message, "request failed");
        Err(ApiError::Status {
            status: response.status,
            message,
        })
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> Result<T, ApiError> {
        let response = self.send(Method::Get, path, query, Body::Empty)?;
        decode(&response)
    }

    pub fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::Post, path, &[], json_body(body)?)?;
        decode(&response)
    }

    pub fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::Put, path, &[], json_body(body)?)?;
        decode(&response)
    }

    /// DELETE; the response body is returned as loose JSON (`Null` when empty).
    pub fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.send(Method::Delete, path, &[], Body::Empty)?;
        decode(&response)
    }

    pub fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
        fields: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let body = Body::Multipart {
            file_field: "file".into(),
            file_name: file_name.to_string(),
            bytes,
            fields,
        };
        let response = self.send(Method::Post, path, &[], body)?;
        decode(&response)
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<Body, ApiError> {
    serde_json::to_value(body)
        .map(Body::Json)
        .map_err(|err| ApiError::Decode(err.to_string()))
}

/// Empty bodies decode as JSON `null`.
pub fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ApiError> {
    let text = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(text).map_err(|err| ApiError::Decode(err.to_string()))
}
