use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum GistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status}")]
    CommandFailed { program: String, status: ExitStatus },
    #[error("No selector available from '{0}'")]
    SelectorUnavailable(String),
    #[error("Nothing selected")]
    NoSelection,
}
impl GistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GistError::Io {
            path: path.into(),
            source,
        }
    }
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        GistError::Spawn {
            program: program.into(),
            source,
        }
    }
    pub fn check_status(program: impl Into<String>, status: ExitStatus) -> Result<(), Self> {
        if status.success() {
            Ok(())
        } else {
            Err(GistError::CommandFailed {
                program: program.into(),
                status,
            })
        }
    }
}
