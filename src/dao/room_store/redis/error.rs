//! Error types shared by the Redis REST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`RedisDaoError`] failures.
pub type RedisResult<T> = Result<T, RedisDaoError>;

/// Failures that can occur while talking to the Redis REST endpoint.
#[derive(Debug, Error)]
pub enum RedisDaoError {
    /// Required environment variable is missing.
    #[error("missing Redis environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Redis client")]
    ClientBuilder {
        /// Underlying client construction error.
        #[source]
        source: reqwest::Error,
    },
    /// A command request could not be sent.
    #[error("failed to send Redis command `{command}`")]
    RequestSend {
        /// Redis command that was being sent.
        command: &'static str,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with an unexpected HTTP status.
    #[error("unexpected Redis response status {status} for command `{command}`")]
    RequestStatus {
        /// Redis command that was being sent.
        command: &'static str,
        /// Status the endpoint answered with.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode Redis response for command `{command}`")]
    DecodeResponse {
        /// Redis command that was being sent.
        command: &'static str,
        /// Underlying deserialization error.
        #[source]
        source: reqwest::Error,
    },
    /// Redis executed the request but reported a command-level error.
    #[error("Redis command `{command}` failed: {message}")]
    CommandFailed {
        /// Redis command that was being sent.
        command: &'static str,
        /// Error text reported by the endpoint.
        message: String,
    },
    /// The command succeeded but returned a value of an unexpected shape.
    #[error("unexpected Redis reply for command `{command}`")]
    UnexpectedReply {
        /// Redis command that was being sent.
        command: &'static str,
    },
}

impl From<RedisDaoError> for StorageError {
    fn from(error: RedisDaoError) -> Self {
        let message = error.to_string();
        StorageError::unavailable(message, error)
    }
}
