//! Configuration module
//!
//! The pipeline configuration is loaded once at process entry from the environment
//! (a `.env` file is honored) and handed to every component constructor.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CODEC_LABEL, DEFAULT_WORK_DIR_NAME, MIN_PROCESSING_DURATION_SECS, PREVIEW_RANGES_SECS,
    STREAMING_MANIFEST_EXTENSIONS, THUMBNAIL_INTERVAL_SECS, TOOL_TIMEOUT_SECS,
};
use crate::models::{PreviewRange, RenditionSize};
use crate::storage_types::StorageBackend;

/// External media tool settings
#[derive(Clone, Debug)]
pub struct ToolConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub timeout: Duration,
}

/// What gets rendered for each source
#[derive(Clone, Debug)]
pub struct RenditionConfig {
    pub thumbnail_interval_secs: u64,
    /// Size classes in generation order
    pub thumbnail_sizes: Vec<RenditionSize>,
    pub preview_ranges: Vec<PreviewRange>,
    pub streaming_extensions: Vec<String>,
    pub min_duration_secs: f64,
    pub codec_label: String,
}

/// Remote object store settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub public_read: bool,
    pub credentials_path: Option<PathBuf>,
    pub local_path: Option<PathBuf>,
    pub local_base_url: Option<String>,
    /// Overrides the backend's own public URL scheme, e.g. a CDN in front of the bucket
    pub public_base_url: Option<String>,
}

/// Batch run settings
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub work_dir: PathBuf,
    pub output_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub max_concurrent_sources: usize,
    pub environment: String,
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub tools: ToolConfig,
    pub renditions: RenditionConfig,
    pub storage: StorageConfig,
    pub run: RunConfig,
}

impl Default for RenditionConfig {
    fn default() -> Self {
        Self {
            thumbnail_interval_secs: THUMBNAIL_INTERVAL_SECS,
            thumbnail_sizes: RenditionSize::ALL.to_vec(),
            preview_ranges: PREVIEW_RANGES_SECS
                .iter()
                .map(|(start_secs, end_secs)| PreviewRange {
                    start_secs: *start_secs,
                    end_secs: *end_secs,
                })
                .collect(),
            streaming_extensions: STREAMING_MANIFEST_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_duration_secs: MIN_PROCESSING_DURATION_SECS,
            codec_label: DEFAULT_CODEC_LABEL.to_string(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            timeout: Duration::from_secs(TOOL_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const OUTPUT_FILE: &str = "outputs/response.json";
        const LOG_FILE: &str = "outputs/process_log.txt";
        const MAX_CONCURRENT_SOURCES: usize = 1;

        let defaults = RenditionConfig::default();

        let tools = ToolConfig {
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            timeout: Duration::from_secs(
                env::var("TOOL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| TOOL_TIMEOUT_SECS.to_string())
                    .parse()
                    .map_err(|_| anyhow::anyhow!("TOOL_TIMEOUT_SECS must be a valid number"))?,
            ),
        };

        let thumbnail_sizes = match env::var("THUMBNAIL_SIZES") {
            Ok(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse)
                .collect::<Result<Vec<RenditionSize>, _>>()?,
            Err(_) => defaults.thumbnail_sizes.clone(),
        };

        let preview_ranges = match env::var("PREVIEW_RANGES") {
            Ok(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse)
                .collect::<Result<Vec<PreviewRange>, _>>()?,
            Err(_) => defaults.preview_ranges.clone(),
        };

        let streaming_extensions = env::var("PREVIEW_MANIFEST_EXTENSIONS")
            .map(|list| {
                list.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| defaults.streaming_extensions.clone());

        let renditions = RenditionConfig {
            thumbnail_interval_secs: env::var("THUMBNAIL_INTERVAL_SECS")
                .unwrap_or_else(|_| THUMBNAIL_INTERVAL_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("THUMBNAIL_INTERVAL_SECS must be a valid number"))?,
            thumbnail_sizes,
            preview_ranges,
            streaming_extensions,
            min_duration_secs: env::var("MIN_DURATION_SECS")
                .unwrap_or_else(|_| MIN_PROCESSING_DURATION_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MIN_DURATION_SECS must be a valid number"))?,
            codec_label: env::var("VIDEO_CODEC_LABEL").unwrap_or(defaults.codec_label),
        };

        let backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "gcs".to_string())
            .parse::<StorageBackend>()?;
        let bucket = match backend {
            StorageBackend::Gcs => env::var("GCS_BUCKET")
                .or_else(|_| env::var("FIREBASE_STORAGE_BUCKET"))
                .ok(),
            _ => env::var("S3_BUCKET").ok(),
        };

        let storage = StorageConfig {
            backend,
            bucket,
            region: env::var("S3_REGION").or_else(|_| env::var("AWS_REGION")).ok(),
            endpoint: env::var("S3_ENDPOINT").ok(),
            public_read: env::var("STORAGE_PUBLIC_READ")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            credentials_path: env::var("GOOGLE_SERVICE_ACCOUNT_PATH")
                .ok()
                .map(PathBuf::from),
            local_path: env::var("LOCAL_STORAGE_PATH").ok().map(PathBuf::from),
            local_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            public_base_url: env::var("PUBLIC_BASE_URL").ok(),
        };

        let run = RunConfig {
            work_dir: env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join(DEFAULT_WORK_DIR_NAME)),
            output_path: PathBuf::from(
                env::var("OUTPUT_FILE").unwrap_or_else(|_| OUTPUT_FILE.to_string()),
            ),
            log_file: match env::var("LOG_FILE") {
                Ok(path) if path.trim().is_empty() => None,
                Ok(path) => Some(PathBuf::from(path)),
                Err(_) => Some(PathBuf::from(LOG_FILE)),
            },
            max_concurrent_sources: env::var("MAX_CONCURRENT_SOURCES")
                .unwrap_or_else(|_| MAX_CONCURRENT_SOURCES.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_CONCURRENT_SOURCES must be a valid number"))?,
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
        };

        Ok(Self {
            tools,
            renditions,
            storage,
            run,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.tools.timeout.is_zero() {
            return Err(anyhow::anyhow!("TOOL_TIMEOUT_SECS must be greater than 0"));
        }
        if self.renditions.thumbnail_interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_INTERVAL_SECS must be greater than 0"
            ));
        }
        if self.renditions.thumbnail_sizes.is_empty() {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_SIZES must name at least one size class"
            ));
        }
        let mut sizes = self.renditions.thumbnail_sizes.clone();
        sizes.sort();
        sizes.dedup();
        if sizes.len() != self.renditions.thumbnail_sizes.len() {
            return Err(anyhow::anyhow!("THUMBNAIL_SIZES contains duplicates"));
        }
        if let Some(range) = self
            .renditions
            .preview_ranges
            .iter()
            .find(|r| r.start_secs >= r.end_secs)
        {
            return Err(anyhow::anyhow!(
                "Preview range {}-{} is empty",
                range.start_secs,
                range.end_secs
            ));
        }
        if !self.renditions.min_duration_secs.is_finite() || self.renditions.min_duration_secs < 0.0
        {
            return Err(anyhow::anyhow!(
                "MIN_DURATION_SECS must be a non-negative number"
            ));
        }
        if self.run.max_concurrent_sources == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_SOURCES must be greater than 0"
            ));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.bucket.is_none() {
                    return Err(anyhow::anyhow!("S3_BUCKET must be set for the s3 backend"));
                }
                if self.storage.region.is_none() && self.storage.endpoint.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set for the s3 backend"
                    ));
                }
            }
            StorageBackend::Gcs => {
                if self.storage.bucket.is_none() {
                    return Err(anyhow::anyhow!("GCS_BUCKET must be set for the gcs backend"));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_path.is_none() || self.storage.local_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set for the local backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.run.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
