use std::path::PathBuf;

use pixel_reduce::ReduceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PNG decode error: {0}")]
    PngDecode(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error(transparent)]
    Reduce(#[from] ReduceError),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{output} is already written by an earlier input than {input}")]
    DuplicateOutput { input: PathBuf, output: PathBuf },
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_error_is_transparent() {
        let err: AppError = ReduceError::InvalidArgument("k must be at least 1".into()).into();
        assert_eq!(err.to_string(), "invalid argument: k must be at least 1");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = AppError::io(
            "missing.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.to_string(), "I/O error on missing.png: no such file");
    }

    #[test]
    fn test_duplicate_output_names_both_paths() {
        let err = AppError::DuplicateOutput {
            input: PathBuf::from("b/x.png"),
            output: PathBuf::from("out/x.png"),
        };
        assert_eq!(
            err.to_string(),
            "out/x.png is already written by an earlier input than b/x.png"
        );
    }
}
