use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotewallError {
    #[error("Not in a notewall project. Run 'notewall init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .notewall/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Ambiguous note id '{0}' matches more than one note")]
    AmbiguousId(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Reasons a wallpaper export can fail. All of them leave no file behind.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("could not find preview surface to capture")]
    MissingTarget,

    #[error("rasterization failed: {0}")]
    Render(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NotewallError>;
