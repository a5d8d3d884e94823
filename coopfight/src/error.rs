use naming::NamingError;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error("network model `{model}` is not configured in {}", path.display())]
    ModelNotConfigured { model: String, path: PathBuf },

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("column `{column}` has {found} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("parameter `{key}` not found in fragment `{fragment}`")]
    MissingFragmentParameter { key: String, fragment: String },

    #[error("rendering failed: {0}")]
    Render(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
