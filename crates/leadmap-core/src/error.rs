use thiserror::Error;

/// Errors raised while loading configuration. All of them are fatal: a run
/// never starts with an invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sectors file {path}: {source}")]
    SectorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sectors file: {0}")]
    SectorsFileParse(#[from] serde_yaml::Error),

    #[error("sector validation failed: {0}")]
    Validation(String),
}
