//! GitHub dependency-graph SBOM download.
//!
//! The dependency-graph endpoint returns an SPDX document base64-encoded
//! inside a JSON envelope; the decoded document feeds the regular SBOM
//! parser as remote evidence.

use std::time::Duration;

use base64::Engine as _;
use serde_json::Value;
use tracing::debug;

use crate::error::{EolScanError, FetchErrorKind, Result};

const API_URL: &str = "https://api.github.com";
const TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("eolscan/", env!("CARGO_PKG_VERSION"));

/// Client for the GitHub dependency-graph SBOM endpoint.
pub struct GithubClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// `token` enables private-repo access and higher rate limits.
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(API_URL, token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                EolScanError::fetch("building HTTP client", FetchErrorKind::ApiError(e.to_string()))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token,
        })
    }

    /// Download and decode the SPDX SBOM for `owner/name`.
    pub fn fetch_dependency_sbom(&self, owner_repo: &str) -> Result<String> {
        let url = format!("{}/repos/{owner_repo}/dependency-graph/sbom", self.base_url);
        debug!(%url, "fetching dependency-graph SBOM");

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| {
            EolScanError::fetch(
                format!("requesting SBOM for '{owner_repo}'"),
                FetchErrorKind::ApiError(e.to_string()),
            )
        })?;

        if response.status() == reqwest::StatusCode::FORBIDDEN
            || response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(EolScanError::fetch(
                format!("requesting SBOM for '{owner_repo}'"),
                FetchErrorKind::RateLimited(format!("GitHub returned {}", response.status())),
            ));
        }
        if !response.status().is_success() {
            return Err(EolScanError::fetch(
                format!("requesting SBOM for '{owner_repo}'"),
                FetchErrorKind::ApiError(format!("GitHub returned {}", response.status())),
            ));
        }

        let envelope: Value = response.json().map_err(|e| {
            EolScanError::fetch(
                format!("decoding SBOM envelope for '{owner_repo}'"),
                FetchErrorKind::InvalidResponse(e.to_string()),
            )
        })?;

        decode_sbom_envelope(&envelope, owner_repo)
    }
}

/// Pull the base64 SPDX payload out of the API envelope.
fn decode_sbom_envelope(envelope: &Value, owner_repo: &str) -> Result<String> {
    let Some(encoded) = envelope.pointer("/sbom/spdx").and_then(Value::as_str) else {
        // Newer API versions inline the SPDX document instead of encoding it.
        if let Some(inline) = envelope.get("sbom").filter(|s| s.is_object()) {
            return serde_json::to_string(inline).map_err(|e| {
                EolScanError::fetch(
                    format!("serializing inline SBOM for '{owner_repo}'"),
                    FetchErrorKind::InvalidResponse(e.to_string()),
                )
            });
        }
        return Err(EolScanError::fetch(
            format!("SBOM envelope for '{owner_repo}'"),
            FetchErrorKind::InvalidResponse("no SBOM content in response".to_string()),
        ));
    };

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| {
            EolScanError::fetch(
                format!("decoding SBOM payload for '{owner_repo}'"),
                FetchErrorKind::InvalidResponse(e.to_string()),
            )
        })?;
    String::from_utf8(decoded).map_err(|e| {
        EolScanError::fetch(
            format!("decoding SBOM payload for '{owner_repo}'"),
            FetchErrorKind::InvalidResponse(e.to_string()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_envelope() {
        let doc = r#"{"spdxVersion":"SPDX-2.3","packages":[]}"#;
        let encoded = base64::engine::general_purpose::STANDARD.encode(doc);
        let envelope = serde_json::json!({ "sbom": { "spdx": encoded } });
        let decoded = decode_sbom_envelope(&envelope, "octocat/hello").unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_inline_sbom_envelope() {
        let envelope = serde_json::json!({
            "sbom": { "spdxVersion": "SPDX-2.3", "packages": [] }
        });
        let decoded = decode_sbom_envelope(&envelope, "octocat/hello").unwrap();
        assert!(decoded.contains("spdxVersion"));
    }

    #[test]
    fn test_missing_content_is_error() {
        let envelope = serde_json::json!({ "message": "Not Found" });
        assert!(decode_sbom_envelope(&envelope, "octocat/hello").is_err());
    }
}
