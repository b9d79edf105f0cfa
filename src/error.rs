// src/error.rs
use thiserror::Error;

/// Failures of the upload flow. All of them are recovered on the upload page.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error("Please drop an image file")]
    InvalidDrop { mime: String },
    #[error("No file is staged")]
    NothingStaged,
    #[error("The preview of {0} is still being decoded")]
    PreviewPending(String),
    #[error("Processing is already running")]
    AlreadyProcessing,
    #[error("Processing has not finished yet ({0}%)")]
    ProgressIncomplete(u8),
    #[error("Cannot remove the file while it is being processed")]
    RemoveWhileProcessing,
    #[error("The image has already been handed off to the viewer")]
    AlreadyHandedOff,
    #[error("Failed to read {name}: {reason}")]
    FileRead { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error("No image reference was supplied")]
    MissingReference,
    #[error("The viewer container is not mounted")]
    NotMounted,
    #[error("Failed to load image: {0}")]
    EngineLoad(String),
    #[error("Fullscreen request was denied: {0}")]
    FullscreenDenied(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Viewer(#[from] ViewerError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Navigation failed: {0}")]
    Navigation(String),
}
