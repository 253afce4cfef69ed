use std::path::PathBuf;

use thiserror::Error;

use crate::capture::frame::StreamKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("RealSense error calling {function}({args}):\n    {message}")]
    Sdk {
        function: String,
        args: String,
        message: String,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid {stream} frame: {reason}")]
    InvalidFrame { stream: StreamKind, reason: String },

    #[error("Snapshot incomplete: {failed} of {total} artifacts failed")]
    Snapshot {
        failed: usize,
        total: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Display error: {0}")]
    Display(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl Error {
    /// Build an SDK error from the failing call and its arguments
    pub fn sdk(
        function: impl Into<String>,
        args: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Error::Sdk {
            function: function.into(),
            args: args.into(),
            message: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_frame(stream: StreamKind, reason: impl Into<String>) -> Self {
        Error::InvalidFrame {
            stream,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_error_names_function_and_args() {
        let err = Error::sdk("rs2_pipeline_start", "pipe:0x1, config:0x2", "No device connected");
        assert_eq!(
            err.to_string(),
            "RealSense error calling rs2_pipeline_start(pipe:0x1, config:0x2):\n    No device connected"
        );
    }

    #[test]
    fn io_error_mentions_path() {
        let err = Error::io(
            "output/snap-color-1.png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("output/snap-color-1.png"));
    }
}
