use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    #[error("Could not find any store area in {}", path.display())]
    FormatNotRecognized { path: PathBuf },

    #[error("Invalid tiddler store: {0}")]
    Structure(String),

    #[error("Invalid tiddler JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tiddler not found: {0}")]
    TiddlerNotFound(String),

    #[error("Field name is reserved: {0}")]
    ReservedField(String),

    #[error("Cannot write the store back into the document: {0}")]
    Boundary(String),

    #[error("Store state is inconsistent: {0}")]
    Inconsistent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace wiki file: {0}")]
    Persist(#[from] tempfile::PersistError),
}
