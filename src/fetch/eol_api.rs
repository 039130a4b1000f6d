//! endoflife.date client: builds the lifecycle dataset the pipeline
//! consumes.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{EolScanError, FetchErrorKind, Result};
use crate::model::{LifecycleCycle, LifecycleTable};

use super::cache::FileCache;

const BASE_URL: &str = "https://endoflife.date/api";
const CACHE_TTL: Duration = Duration::from_secs(24 * 3600);
const TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the endoflife.date API with a 24-hour file cache.
pub struct EolApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    cache: FileCache,
}

impl EolApiClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| {
                EolScanError::fetch("building HTTP client", FetchErrorKind::ApiError(e.to_string()))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            cache: FileCache::new("eol", CACHE_TTL),
        })
    }

    /// Fetch all release cycles for one family slug.
    pub fn fetch_family(&self, slug: &str) -> Result<Vec<LifecycleCycle>> {
        if let Some(cycles) = self.cache.load::<Vec<LifecycleCycle>>(slug) {
            return Ok(cycles);
        }

        let url = format!("{}/{slug}.json", self.base_url);
        debug!(%url, "fetching lifecycle data");
        let response = self.http.get(&url).send().map_err(|e| {
            EolScanError::fetch(
                format!("requesting cycles for '{slug}'"),
                FetchErrorKind::ApiError(e.to_string()),
            )
        })?;

        if !response.status().is_success() {
            return Err(EolScanError::fetch(
                format!("requesting cycles for '{slug}'"),
                FetchErrorKind::ApiError(format!("endoflife.date returned {}", response.status())),
            ));
        }

        let cycles: Vec<LifecycleCycle> = response.json().map_err(|e| {
            EolScanError::fetch(
                format!("decoding cycles for '{slug}'"),
                FetchErrorKind::InvalidResponse(e.to_string()),
            )
        })?;

        if let Err(err) = self.cache.store(slug, &cycles) {
            warn!(slug, %err, "failed to cache lifecycle data");
        }
        Ok(cycles)
    }

    /// Build a dataset covering the given family slugs.
    ///
    /// A family that fails to fetch is logged and left out; the scan then
    /// classifies its items as Unknown instead of aborting.
    #[must_use]
    pub fn load_dataset(&self, slugs: &[&str]) -> LifecycleTable {
        let mut table = LifecycleTable::new();
        for slug in slugs {
            match self.fetch_family(slug) {
                Ok(cycles) => table.insert(*slug, cycles),
                Err(err) => warn!(slug, %err, "skipping family"),
            }
        }
        table
    }
}
