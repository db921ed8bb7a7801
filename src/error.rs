use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop a conversion before anything is written
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("No title found in {}", path.display())]
    MissingTitle { path: PathBuf },

    #[error("front matter is opened with '---' but never closed")]
    UnclosedFrontMatter,

    #[error("front matter is not valid YAML: {reason}")]
    MalformedFrontMatter { reason: String },

    #[error("title {title:?} leaves nothing usable as a filename")]
    UnusableTitle { title: String },
}
