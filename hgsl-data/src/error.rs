use std::path::PathBuf;

use hgsl_core::HypergraphError;
use thiserror::Error;

/// Configuration problems: unknown string tags and failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{what} '{tag}' not available")]
    NotAvailable { what: &'static str, tag: String },
    #[error("configuration invalid: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Hypergraph(#[from] HypergraphError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unable to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

pub type DataResult<T, E = DataError> = core::result::Result<T, E>;

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = ConfigError::NotAvailable { what: "loss function", tag: "L1".into() };
        assert_eq!(format!("{}", e), "loss function 'L1' not available");
        assert_eq!(
            format!("{}", ConfigError::Validation("batch_size must be positive".into())),
            "configuration invalid: batch_size must be positive"
        );
        let wrapped: DataError = HypergraphError::ShapeMismatch { expected: 3, found: 1 }.into();
        assert_eq!(format!("{}", wrapped), "shape mismatch: expected 3 nodes, found 1");
    }

    #[test]
    fn io_errors_carry_path() {
        let e = DataError::io(
            "missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(format!("{}", e), "unable to access missing.json: no such file");
    }
}
