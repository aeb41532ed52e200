use std::{fmt, time::Duration};

use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use super::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    /// One file part plus repeated text fields.
    Multipart {
        file_field: String,
        file_name: String,
        bytes: Vec<u8>,
        fields: Vec<(String, String)>,
    },
}

/// A fully resolved request. `url` already includes the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests. Status handling is the client's job; a transport only
/// fails when no response arrived.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Blocking HTTP transport.
pub struct HttpTransport {
    client: Client,
}

/// Upper bound on a request timeout; reqwest adds it to `Instant::now()`.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(86_400);

impl HttpTransport {
    /// Timeouts above [`MAX_TIMEOUT`] are clamped.
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout.min(MAX_TIMEOUT))
            .build()
            .map_err(|err| ApiError::Network {
                message: err.to_string(),
                connect: false,
            })?;
        Ok(Self { client })
    }

    fn builder(&self, request: &ApiRequest) -> Result<RequestBuilder, ApiError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };
        builder = builder.header("Accept", "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        let builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart {
                file_field,
                file_name,
                bytes,
                fields,
            } => {
                let part = multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime_for(file_name))
                    .map_err(|err| ApiError::Network {
                        message: err.to_string(),
                        connect: false,
                    })?;
                let mut form = multipart::Form::new().part(file_field.clone(), part);
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                builder.multipart(form)
            }
        };
        Ok(builder)
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self
            .builder(request)?
            .send()
            .map_err(|err| ApiError::Network {
                message: err.to_string(),
                connect: err.is_connect() || err.is_timeout(),
            })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|err| ApiError::Network {
            message: format!("failed to read response body: {}", err),
            connect: false,
        })?;
        debug!(status, "response received");
        Ok(ApiResponse { status, body })
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}
