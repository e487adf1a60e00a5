use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid idx file {file}: {reason}")]
    InvalidIdx { file: String, reason: String },
    #[error("config error on {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },
    #[error("recorder error: {0}")]
    Recorder(#[from] burn::record::RecorderError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("argument error: {0}")]
    Args(#[from] pico_args::Error),
    #[error("unused arguments: {0:?}")]
    UnusedArgs(Vec<std::ffi::OsString>),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_idx(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidIdx {
            file: file.into(),
            reason: reason.into(),
        }
    }
}
