//! Runtime configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CLIP_ENDPOINT: &str = "https://cartoonizer-clip-test-4jkxk521l3v1.octoai.cloud";
pub const DEFAULT_SD_ENDPOINT: &str = "https://cartoonizer-sd-demo-cgi-4jkxk521l3v1.octoai.cloud";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Captioning (CLIP interrogator) base URL
    pub clip_endpoint: String,
    /// Stable Diffusion img2img base URL
    pub sd_endpoint: String,
    /// Bearer token for both endpoints, if they require one
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    pub watermark_path: PathBuf,
    pub watermark_opacity: f32,
    pub assets_dir: PathBuf,
    /// Where to save the last watermarked result
    pub output_path: Option<PathBuf>,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            clip_endpoint: DEFAULT_CLIP_ENDPOINT.to_string(),
            sd_endpoint: DEFAULT_SD_ENDPOINT.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(120),
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
            watermark_path: PathBuf::from("assets/watermark.png"),
            watermark_opacity: 1.0,
            assets_dir: PathBuf::from("assets"),
            output_path: None,
            log_json: false,
        }
    }
}

impl Config {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup. Unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let clip_endpoint = endpoint(lookup("CLIP_ENDPOINT"), "CLIP_ENDPOINT", &defaults.clip_endpoint)?;
        let sd_endpoint = endpoint(lookup("SD_ENDPOINT"), "SD_ENDPOINT", &defaults.sd_endpoint)?;

        let watermark_opacity = match get("WATERMARK_OPACITY") {
            Some(v) => parse::<f32>("WATERMARK_OPACITY", "a number between 0 and 1", &v)?
                .clamp(0.0, 1.0),
            None => defaults.watermark_opacity,
        };

        Ok(Self {
            host: get("CARTOONIZER_HOST").unwrap_or(defaults.host),
            port: match get("CARTOONIZER_PORT") {
                Some(v) => parse("CARTOONIZER_PORT", "a port number", &v)?,
                None => defaults.port,
            },
            clip_endpoint,
            sd_endpoint,
            api_token: get("OCTOAI_TOKEN"),
            request_timeout: match get("REQUEST_TIMEOUT") {
                Some(v) => Duration::from_secs(parse("REQUEST_TIMEOUT", "whole seconds", &v)?),
                None => defaults.request_timeout,
            },
            max_upload_bytes: match get("MAX_UPLOAD_BYTES") {
                Some(v) => parse("MAX_UPLOAD_BYTES", "a byte count", &v)?,
                None => defaults.max_upload_bytes,
            },
            watermark_path: get("WATERMARK_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.watermark_path),
            watermark_opacity,
            assets_dir: get("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            output_path: get("OUTPUT_PATH").map(PathBuf::from),
            log_json: get("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Invalid {
            var: "CARTOONIZER_HOST",
            expected: "an IP address",
            value: self.host.clone(),
        })
    }
}

fn parse<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value: value.to_string(),
    })
}

fn endpoint(value: Option<String>, var: &'static str, default: &str) -> Result<String, ConfigError> {
    match value {
        None => Ok(default.to_string()),
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(var)),
        Some(v) => Ok(v.trim().trim_end_matches('/').to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.clip_endpoint, DEFAULT_CLIP_ENDPOINT);
        assert_eq!(config.sd_endpoint, DEFAULT_SD_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.api_token.is_none());
        assert!(config.output_path.is_none());
        assert!(!config.log_json);
        assert_eq!(config.bind_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CARTOONIZER_PORT", "8080"),
            ("CLIP_ENDPOINT", "http://localhost:9000/"),
            ("OCTOAI_TOKEN", "secret"),
            ("WATERMARK_OPACITY", "3.5"),
            ("OUTPUT_PATH", "out.png"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.clip_endpoint, "http://localhost:9000");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.watermark_opacity, 1.0);
        assert_eq!(config.output_path, Some(PathBuf::from("out.png")));
        assert!(config.log_json);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = config_from(&[("CARTOONIZER_PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CARTOONIZER_PORT must be a port number, got \"eighty\""
        );

        let err = config_from(&[("SD_ENDPOINT", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Empty("SD_ENDPOINT")));
    }

    #[test]
    fn test_bad_host() {
        let config = config_from(&[("CARTOONIZER_HOST", "localhost")]).unwrap();
        assert!(config.bind_addr().is_err());
    }
}
