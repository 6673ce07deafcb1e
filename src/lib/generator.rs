//! Client side of the external image-generation service.
//!
//! The page only needs one thing from the service: "turn this prompt into an
//! image". That contract is the [`ImageGenerator`] trait, so the slot state
//! machine can be driven by the real HTTP client or by a test double.
//!
//! [`GeminiImageClient`] talks to the Gemini `generateContent` endpoint and
//! requires the `fetch` feature. Access requires an API key taken from the
//! process environment; see [`Credential::from_env`].

use crate::images::data_uri;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model used when the content configuration does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Base URL of the generative language REST API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables checked for the API key, in order.
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// An API key for the generation service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a key; blank keys are treated as absent.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Credential(trimmed.to_string()))
        }
    }

    /// Reads the key from `GEMINI_API_KEY`, then `API_KEY`.
    pub fn from_env() -> Option<Self> {
        CREDENTIAL_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find_map(|value| Credential::new(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// A pending request for one section's illustration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub section_id: String,
    pub model: String,
    pub prompt: String,
}

/// Image bytes returned by the service, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data_base64: String,
}

impl GeneratedImage {
    pub fn to_data_uri(&self) -> String {
        data_uri(&self.mime_type, &self.data_base64)
    }
}

/// Failures talking to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The request never got a response (DNS, TLS, connection refused, ...)
    Network(String),
    /// The service answered with a non-success status
    Service { status: u16, message: String },
    /// The service answered, but without any image payload
    EmptyResponse,
    /// The response body could not be understood
    InvalidResponse(String),
    /// The crate was built without HTTP support
    Unavailable,
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Network(e) => write!(f, "Could not reach the image service: {}", e),
            GenerationError::Service { status, message } => {
                write!(f, "Image service returned {}: {}", status, message)
            }
            GenerationError::EmptyResponse => {
                write!(f, "The image service did not return an image")
            }
            GenerationError::InvalidResponse(e) => {
                write!(f, "Unexpected response from the image service: {}", e)
            }
            GenerationError::Unavailable => write!(
                f,
                "Image generation requires building with the 'fetch' feature"
            ),
        }
    }
}

impl std::error::Error for GenerationError {}

/// Anything that can turn a prompt into an image.
pub trait ImageGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, GenerationError>;
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Serializes the request body for a `generateContent` call.
pub fn request_body(prompt: &str) -> String {
    let body = GenerateContentRequest {
        contents: vec![RequestContent {
            parts: vec![RequestPart { text: prompt }],
        }],
    };
    // Serializing plain strings into JSON cannot fail.
    serde_json::to_string(&body).unwrap_or_default()
}

/// Extracts the first inline image from a `generateContent` response body.
pub fn parse_response(body: &str) -> Result<GeneratedImage, GenerationError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.inline_data)
        .find(|d| !d.data.is_empty())
        .map(|d| GeneratedImage {
            mime_type: d.mime_type.unwrap_or_else(|| "image/png".to_string()),
            data_base64: d.data,
        })
        .ok_or(GenerationError::EmptyResponse)
}

/// Pulls a readable message out of an error response, falling back to the raw body.
pub fn parse_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

/// HTTP client for the Gemini image model.
pub struct GeminiImageClient {
    endpoint: String,
    credential: Credential,
    #[cfg(feature = "fetch")]
    client: reqwest::blocking::Client,
}

impl GeminiImageClient {
    pub fn new(credential: Credential) -> Self {
        Self::with_endpoint(credential, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(credential: Credential, endpoint: impl Into<String>) -> Self {
        GeminiImageClient {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credential,
            #[cfg(feature = "fetch")]
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn url_for(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }
}

impl ImageGenerator for GeminiImageClient {
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, GenerationError> {
        let url = self.url_for(&request.model);
        info!(
            "Requesting illustration for section '{}' from {}",
            request.section_id, request.model
        );
        debug!("[generator] POST {}", url);

        #[cfg(feature = "fetch")]
        {
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", self.credential.expose())
                .header("content-type", "application/json")
                .body(request_body(&request.prompt))
                .send()
                .map_err(|e| GenerationError::Network(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .map_err(|e| GenerationError::Network(format!("Failed to read response: {}", e)))?;

            if !status.is_success() {
                return Err(GenerationError::Service {
                    status: status.as_u16(),
                    message: parse_error_message(&body),
                });
            }
            parse_response(&body)
        }

        #[cfg(not(feature = "fetch"))]
        {
            let _ = &self.credential;
            Err(GenerationError::Unavailable)
        }
    }
}
