//! CLI error types.

use umlgate_codec::DecodeError;
use umlgate_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Server(String),
}
