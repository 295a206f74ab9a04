use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::shared::constants::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};

/// Settings every command needs
///
/// Storage credentials are only required to upload, so [`StorageConfig`] is
/// loaded separately by the submission flow.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub map: MapConfig,
    pub poll: PollConfig,
}

/// REST backend configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Static key sent as `X-API-Key` on every request
    pub api_key: String,
    pub timeout: Duration,
}

/// S3-compatible storage configuration for image uploads
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 endpoint URL (empty means the AWS endpoint for `region`)
    pub endpoint: Option<String>,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone)]
pub struct MapConfig {
    pub style: String,
    /// Where the marker source GeoJSON is written
    pub output_path: PathBuf,
}

/// Classification long-poll budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            api: ApiConfig::from_env()?,
            map: MapConfig::from_env()?,
            poll: PollConfig::from_env()?,
        })
    }
}

impl ApiConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("MAINT_API_BASE_URL")
            .map_err(|_| "MAINT_API_BASE_URL environment variable is required".to_string())?
            .trim_end_matches('/')
            .to_string();

        let api_key = env::var("MAINT_API_KEY")
            .map_err(|_| "MAINT_API_KEY environment variable is required".to_string())?;

        let timeout_secs = env::var("MAINT_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "MAINT_API_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl StorageConfig {
    const DEFAULT_REGION: &'static str = "us-east-1";
    const BUCKET_BASE_NAME: &'static str = "dl-suggest-blog-uploaded-images";

    pub fn from_env() -> Result<Self, String> {
        let endpoint = env::var("MAINT_STORAGE_ENDPOINT")
            .ok()
            .filter(|s| !s.is_empty());

        // An explicit bucket wins; otherwise it is derived from the deployment suffix
        let bucket = match env::var("MAINT_STORAGE_BUCKET").ok().filter(|s| !s.is_empty()) {
            Some(bucket) => bucket,
            None => {
                let suffix = env::var("MAINT_UNIQUE_SUFFIX").map_err(|_| {
                    "MAINT_STORAGE_BUCKET or MAINT_UNIQUE_SUFFIX must be set".to_string()
                })?;
                format!("{}-{}", Self::BUCKET_BASE_NAME, suffix)
            }
        };

        let region = match env::var("MAINT_STORAGE_REGION").ok().filter(|s| !s.is_empty()) {
            Some(region) => region,
            None => env::var("MAINT_IDENTITY_POOL_ID")
                .ok()
                .and_then(|pool| region_from_identity_pool(&pool))
                .unwrap_or_else(|| Self::DEFAULT_REGION.to_string()),
        };

        let access_key = env::var("MAINT_STORAGE_ACCESS_KEY")
            .map_err(|_| "MAINT_STORAGE_ACCESS_KEY environment variable is required".to_string())?;

        let secret_key = env::var("MAINT_STORAGE_SECRET_KEY")
            .map_err(|_| "MAINT_STORAGE_SECRET_KEY environment variable is required".to_string())?;

        Ok(Self {
            endpoint,
            bucket,
            region,
            access_key,
            secret_key,
        })
    }
}

impl MapConfig {
    pub fn from_env() -> Result<Self, String> {
        let style = match env::var("MAINT_MAP_STYLE").ok().filter(|s| !s.is_empty()) {
            Some(style) => style,
            None => {
                let suffix = env::var("MAINT_UNIQUE_SUFFIX").unwrap_or_default();
                if suffix.is_empty() {
                    "DL-Suggest-Blog-Map".to_string()
                } else {
                    format!("DL-Suggest-Blog-Map-{}", suffix)
                }
            }
        };

        let output_path = env::var("MAINT_MAP_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("places.geojson"));

        Ok(Self { style, output_path })
    }
}

impl PollConfig {
    pub fn from_env() -> Result<Self, String> {
        let interval_ms = env::var("MAINT_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "MAINT_POLL_INTERVAL_MS must be a valid number".to_string())?;

        let max_attempts = env::var("MAINT_POLL_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_MAX_POLL_ATTEMPTS.to_string())
            .parse::<u32>()
            .map_err(|_| "MAINT_POLL_MAX_ATTEMPTS must be a valid number".to_string())?;

        if max_attempts == 0 {
            return Err("MAINT_POLL_MAX_ATTEMPTS must be at least 1".to_string());
        }

        Ok(Self {
            interval: Duration::from_millis(interval_ms),
            max_attempts,
        })
    }
}

/// Identity pool ids look like `us-east-1:1a2b...`; the region is the part before `:`.
fn region_from_identity_pool(pool_id: &str) -> Option<String> {
    pool_id
        .split_once(':')
        .map(|(region, _)| region.trim())
        .filter(|region| !region.is_empty())
        .map(str::to_string)
}
