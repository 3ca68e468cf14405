use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State error: {0}")]
    State(String),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {}: {message}", path.display())]
    Serialize { path: PathBuf, message: String },

    #[error("Failed to install {} as {coords}: {reason}", path.display())]
    Install {
        coords: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Artifact {0} is not installed in the local repository")]
    NotInstalled(String),
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegistryError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialize(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        RegistryError::Serialize {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
