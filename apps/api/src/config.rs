use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::media::sampler::DEFAULT_FRAME_COUNT;

/// Upper bound on frames a caller may request per video.
pub const MAX_FRAME_COUNT: usize = 30;
/// Upper bound on repeated model calls per analysed image.
pub const MAX_REPEAT_COUNT: usize = 5;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
    pub default_frame_count: usize,
    pub default_repeat_count: usize,
    pub max_upload_bytes: usize,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub frame_read_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: optional_env("GEMINI_MODEL", "gemini-1.5-flash"),
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG", "info"),
            default_frame_count: parse_env("DEFAULT_FRAME_COUNT", DEFAULT_FRAME_COUNT)?,
            default_repeat_count: parse_env("DEFAULT_REPEAT_COUNT", 3)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 200 * 1024 * 1024)?,
            ffmpeg_path: optional_env("FFMPEG_PATH", "ffmpeg").into(),
            ffprobe_path: optional_env("FFPROBE_PATH", "ffprobe").into(),
            frame_read_timeout: Duration::from_secs(parse_env("FRAME_READ_TIMEOUT_SECS", 30)?),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (1..=MAX_FRAME_COUNT).contains(&self.default_frame_count),
            "DEFAULT_FRAME_COUNT must be between 1 and {MAX_FRAME_COUNT}"
        );
        anyhow::ensure!(
            (1..=MAX_REPEAT_COUNT).contains(&self.default_repeat_count),
            "DEFAULT_REPEAT_COUNT must be between 1 and {MAX_REPEAT_COUNT}"
        );
        anyhow::ensure!(self.max_upload_bytes > 0, "MAX_UPLOAD_BYTES must be positive");
        anyhow::ensure!(
            !self.frame_read_timeout.is_zero(),
            "FRAME_READ_TIMEOUT_SECS must be positive"
        );
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        gemini_api_key: "test-key".to_string(),
        gemini_model: "gemini-test".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        default_frame_count: DEFAULT_FRAME_COUNT,
        default_repeat_count: 3,
        max_upload_bytes: 1024 * 1024,
        ffmpeg_path: "ffmpeg".into(),
        ffprobe_path: "ffprobe".into(),
        frame_read_timeout: Duration::from_secs(5),
    }
}
