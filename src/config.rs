use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HF_MODEL: &str = "stabilityai/stable-diffusion-2-1";
pub const DEFAULT_HF_API_BASE: &str = "https://api-inference.huggingface.co";
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// Process configuration, resolved once at startup and handed to the
/// components that need it.
#[derive(Clone, Debug)]
pub struct Config {
    pub hf_token: Option<String>,
    pub hf_model: String,
    pub hf_api_base: String,
    pub request_timeout: Duration,
    pub port: u16,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let request_timeout = get("HF_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let max_upload_mb = get("MAX_UPLOAD_MB")
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        Self {
            hf_token: get("HF_TOKEN"),
            hf_model: get("HF_MODEL").unwrap_or_else(|| DEFAULT_HF_MODEL.to_string()),
            hf_api_base: get("HF_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_HF_API_BASE.to_string()),
            request_timeout: Duration::from_secs(request_timeout),
            port: get("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            data_dir: get("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".")),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.data_dir.join("generated")
    }
}
