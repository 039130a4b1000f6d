//! Package-registry lookups supplying release metadata for the staleness
//! evaluator: PyPI and the npm registry.

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EolScanError, FetchErrorKind, Result};
use crate::pipeline::ReleaseInfo;

use super::cache::FileCache;

const PYPI_URL: &str = "https://pypi.org/pypi";
const NPM_URL: &str = "https://registry.npmjs.org";
const CACHE_TTL: Duration = Duration::from_secs(12 * 3600);
const TIMEOUT: Duration = Duration::from_secs(20);

/// Registry client with a 12-hour file cache.
pub struct RegistryClient {
    http: reqwest::blocking::Client,
    pypi_url: String,
    npm_url: String,
    cache: FileCache,
}

impl RegistryClient {
    pub fn new() -> Result<Self> {
        Self::with_base_urls(PYPI_URL, NPM_URL)
    }

    pub fn with_base_urls(pypi_url: impl Into<String>, npm_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| {
                EolScanError::fetch("building HTTP client", FetchErrorKind::ApiError(e.to_string()))
            })?;
        Ok(Self {
            http,
            pypi_url: pypi_url.into(),
            npm_url: npm_url.into(),
            cache: FileCache::new("registry", CACHE_TTL),
        })
    }

    /// Release metadata for a package, dispatched by ecosystem name.
    ///
    /// Unknown ecosystems and lookup failures yield `None`: a package
    /// without registry data is still scanned, it just lands on Unknown
    /// staleness.
    #[must_use]
    pub fn release_info(&self, ecosystem: &str, name: &str) -> Option<ReleaseInfo> {
        let result = match ecosystem {
            "PyPI" => self.pypi_release(name),
            "npm" => self.npm_release(name),
            _ => return None,
        };
        match result {
            Ok(info) => Some(info),
            Err(err) => {
                warn!(ecosystem, name, %err, "registry lookup failed");
                None
            }
        }
    }

    /// Last release date and latest version from the PyPI JSON API.
    ///
    /// The release date is the newest upload time across all files of all
    /// releases, not the latest version's date: a backported fix to an old
    /// branch still counts as maintenance activity.
    pub fn pypi_release(&self, name: &str) -> Result<ReleaseInfo> {
        let cache_key = format!("pypi:{name}");
        if let Some(info) = self.cache.load::<ReleaseInfo>(&cache_key) {
            return Ok(info);
        }

        let url = format!("{}/{name}/json", self.pypi_url);
        let data = self.get_json(&url, name)?;

        let latest_version = data
            .pointer("/info/version")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut last_upload: Option<NaiveDate> = None;
        if let Some(releases) = data.get("releases").and_then(Value::as_object) {
            for files in releases.values().filter_map(Value::as_array) {
                for file in files {
                    let ts = file
                        .get("upload_time_iso_8601")
                        .or_else(|| file.get("upload_time"))
                        .and_then(Value::as_str);
                    if let Some(date) = ts.and_then(parse_timestamp_date) {
                        if last_upload.map_or(true, |d| date > d) {
                            last_upload = Some(date);
                        }
                    }
                }
            }
        }

        let info = ReleaseInfo {
            last_release_date: last_upload,
            latest_version,
        };
        if let Err(err) = self.cache.store(&cache_key, &info) {
            warn!(name, %err, "failed to cache registry data");
        }
        Ok(info)
    }

    /// Last release date and latest version from the npm registry.
    pub fn npm_release(&self, name: &str) -> Result<ReleaseInfo> {
        let cache_key = format!("npm:{name}");
        if let Some(info) = self.cache.load::<ReleaseInfo>(&cache_key) {
            return Ok(info);
        }

        let url = format!("{}/{name}", self.npm_url);
        let data = self.get_json(&url, name)?;

        let last_release_date = data
            .pointer("/time/modified")
            .or_else(|| data.pointer("/time/created"))
            .and_then(Value::as_str)
            .and_then(parse_timestamp_date);
        let latest_version = data
            .pointer("/dist-tags/latest")
            .and_then(Value::as_str)
            .map(str::to_string);

        let info = ReleaseInfo {
            last_release_date,
            latest_version,
        };
        if let Err(err) = self.cache.store(&cache_key, &info) {
            warn!(name, %err, "failed to cache registry data");
        }
        Ok(info)
    }

    fn get_json(&self, url: &str, name: &str) -> Result<Value> {
        debug!(%url, "fetching registry data");
        let response = self.http.get(url).send().map_err(|e| {
            EolScanError::fetch(
                format!("requesting registry data for '{name}'"),
                FetchErrorKind::ApiError(e.to_string()),
            )
        })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EolScanError::fetch(
                format!("requesting registry data for '{name}'"),
                FetchErrorKind::RateLimited("registry returned 429".to_string()),
            ));
        }
        if !response.status().is_success() {
            return Err(EolScanError::fetch(
                format!("requesting registry data for '{name}'"),
                FetchErrorKind::ApiError(format!("registry returned {}", response.status())),
            ));
        }

        response.json().map_err(|e| {
            EolScanError::fetch(
                format!("decoding registry data for '{name}'"),
                FetchErrorKind::InvalidResponse(e.to_string()),
            )
        })
    }
}

/// Extract the date from an ISO-8601 timestamp, tolerating both the
/// `Z`-suffixed and offset forms.
fn parse_timestamp_date(ts: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.date_naive());
    }
    // PyPI's legacy upload_time field has no offset.
    chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.date())
        .ok()
}
