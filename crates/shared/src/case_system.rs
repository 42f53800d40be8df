//! HTTP client for the external case-management system.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::CaseSystemConfig;

/// Bytes of an error response kept in `CaseSystemError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// Case system client errors.
#[derive(Debug, Error)]
pub enum CaseSystemError {
    /// The HTTP client could not be built.
    #[error("case system client configuration error: {0}")]
    Configuration(String),
    /// The request failed before a response was received.
    #[error("case system request failed: {0}")]
    Request(String),
    /// The case system answered with a non-success status.
    #[error("case system returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },
}

/// Request to open a case for one application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCaseRequest {
    /// Application being submitted.
    pub application_id: Uuid,
    /// Human readable application number.
    pub application_number: i32,
    /// Case title.
    pub title: String,
    /// Employer name.
    pub company_name: String,
    /// Employer business id.
    pub business_id: String,
    /// Where the case system posts the result.
    pub callback_url: String,
    /// Links the case system uses to fetch attachment files.
    pub attachment_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenCaseResponse {
    request_id: Uuid,
}

/// Client for the case system REST API.
#[derive(Debug, Clone)]
pub struct CaseSystemClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    public_url: String,
}

impl CaseSystemClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CaseSystemConfig) -> Result<Self, CaseSystemError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CaseSystemError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL the case system calls back for an application.
    #[must_use]
    pub fn callback_url(&self, application_id: Uuid) -> String {
        format!(
            "{}/api/v1/case-system/callback/{application_id}",
            self.public_url
        )
    }

    /// URL the case system uses to download one attachment.
    #[must_use]
    pub fn attachment_url(&self, attachment_id: Uuid) -> String {
        format!(
            "{}/api/v1/case-system/attachments/{attachment_id}",
            self.public_url
        )
    }

    /// Sends an open-case request and returns the request id assigned by the case system.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn open_case(&self, request: &OpenCaseRequest) -> Result<Uuid, CaseSystemError> {
        let response = self
            .http
            .post(format!("{}/cases", self.base_url))
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await
            .map_err(|e| CaseSystemError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CaseSystemError::Status {
                status: status.as_u16(),
                body: truncate_body(body, MAX_ERROR_BODY),
            });
        }

        let parsed: OpenCaseResponse = response
            .json()
            .await
            .map_err(|e| CaseSystemError::Request(e.to_string()))?;

        tracing::info!(
            application_id = %request.application_id,
            request_id = %parsed.request_id,
            "open case request accepted"
        );
        Ok(parsed.request_id)
    }
}

/// Cuts `body` to at most `max` bytes without splitting a character.
fn truncate_body(mut body: String, max: usize) -> String {
    body.truncate(body.floor_char_boundary(max));
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_truncated_on_char_boundary() {
        let body = format!("x{}", "ä".repeat(400));
        let truncated = truncate_body(body, MAX_ERROR_BODY);

        assert_eq!(truncated.len(), 511);
        assert!(truncated.ends_with('ä'));
        assert_eq!(truncate_body("virhe".to_string(), MAX_ERROR_BODY), "virhe");
    }

    fn client() -> CaseSystemClient {
        CaseSystemClient::new(&CaseSystemConfig {
            base_url: "https://cases.example/api/".to_string(),
            public_url: "https://benefit.example/".to_string(),
            ..CaseSystemConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = client();
        let id = Uuid::nil();
        assert_eq!(client.base_url, "https://cases.example/api");
        assert_eq!(
            client.callback_url(id),
            format!("https://benefit.example/api/v1/case-system/callback/{id}")
        );
        assert_eq!(
            client.attachment_url(id),
            format!("https://benefit.example/api/v1/case-system/attachments/{id}")
        );
    }

    #[test]
    fn test_open_case_request_is_camel_case() {
        let request = OpenCaseRequest {
            application_id: Uuid::nil(),
            application_number: 7,
            title: "Helsinki benefit 7".to_string(),
            company_name: "Acme Oy".to_string(),
            business_id: "1234567-8".to_string(),
            callback_url: "cb".to_string(),
            attachment_urls: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["applicationNumber"], 7);
        assert_eq!(json["callbackUrl"], "cb");
        assert!(json.get("attachmentUrls").is_some());
    }

    #[tokio::test]
    async fn test_unreachable_case_system_is_request_error() {
        let client = CaseSystemClient::new(&CaseSystemConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..CaseSystemConfig::default()
        })
        .unwrap();
        let request = OpenCaseRequest {
            application_id: Uuid::nil(),
            application_number: 1,
            title: String::new(),
            company_name: String::new(),
            business_id: String::new(),
            callback_url: String::new(),
            attachment_urls: vec![],
        };

        let result = client.open_case(&request).await;
        assert!(matches!(result, Err(CaseSystemError::Request(_))));
    }
}
