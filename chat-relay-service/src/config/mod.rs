use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_VISION_MODEL: &str = "llama-3.2-90b-vision-preview";

/// Upper bound on a single upstream completion call.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub upstream: UpstreamConfig,
    pub models: ModelConfig,
    pub rate_limit: RateLimitConfig,
    pub static_dir: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Model used when the current turn is text only
    pub text_model: String,
    /// Model used when the current turn carries at least one image
    pub vision_model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
    /// Key clients on the first `x-forwarded-for` hop. Only safe behind a
    /// proxy that overwrites the header.
    pub trust_forwarded: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            trust_forwarded: false,
        }
    }
}

impl ModelConfig {
    /// Pick the model for a turn.
    pub fn select(&self, has_image: bool) -> &str {
        if has_image {
            &self.vision_model
        } else {
            &self.text_model
        }
    }
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        if let Ok(port) = env::var("PORT") {
            common.port = parse_value("PORT", &port)?;
        }

        Ok(RelayConfig {
            common,
            upstream: UpstreamConfig {
                api_key: Secret::new(get_env("GROQ_API_KEY", None, is_prod)?),
                base_url: get_env("GROQ_BASE_URL", Some(DEFAULT_GROQ_BASE_URL), is_prod)?,
                timeout_secs: parse_value(
                    "UPSTREAM_TIMEOUT_SECS",
                    &get_env(
                        "UPSTREAM_TIMEOUT_SECS",
                        Some(&DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string()),
                        is_prod,
                    )?,
                )?,
            },
            models: ModelConfig {
                text_model: get_env("CHAT_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
                vision_model: get_env("CHAT_VISION_MODEL", Some(DEFAULT_VISION_MODEL), is_prod)?,
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_value(
                    "RATE_LIMIT_MAX_REQUESTS",
                    &get_env(
                        "RATE_LIMIT_MAX_REQUESTS",
                        Some(&DEFAULT_RATE_LIMIT_MAX_REQUESTS.to_string()),
                        is_prod,
                    )?,
                )?,
                window_secs: parse_value(
                    "RATE_LIMIT_WINDOW_SECS",
                    &get_env(
                        "RATE_LIMIT_WINDOW_SECS",
                        Some(&DEFAULT_RATE_LIMIT_WINDOW_SECS.to_string()),
                        is_prod,
                    )?,
                )?,
                trust_forwarded: parse_value(
                    "RATE_LIMIT_TRUST_FORWARDED",
                    &get_env("RATE_LIMIT_TRUST_FORWARDED", Some("false"), is_prod)?,
                )?,
            },
            static_dir: get_env("STATIC_DIR", Some("public"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
        })
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
