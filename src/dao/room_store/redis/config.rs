use super::error::{RedisDaoError, RedisResult};

/// Runtime configuration describing how to reach the Redis REST endpoint.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Base URL of the REST endpoint, without a trailing slash.
    pub base_url: String,
    /// Bearer token sent with every command.
    pub token: String,
}

impl RedisConfig {
    /// Construct a configuration from an explicit endpoint and bearer token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> RedisResult<Self> {
        let base_url =
            std::env::var("REDIS_REST_URL").map_err(|_| RedisDaoError::MissingEnvVar {
                var: "REDIS_REST_URL",
            })?;
        let token = std::env::var("REDIS_REST_TOKEN").map_err(|_| RedisDaoError::MissingEnvVar {
            var: "REDIS_REST_TOKEN",
        })?;

        Ok(Self::new(base_url, token))
    }

    /// Whether both environment variables required by [`Self::from_env`] are set.
    pub fn env_present() -> bool {
        std::env::var("REDIS_REST_URL").is_ok() && std::env::var("REDIS_REST_TOKEN").is_ok()
    }
}
