use thiserror::Error;

/// Errors produced while reading or parsing a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog text is not well-formed PO syntax.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The bytes do not match the declared charset, or text has no
    /// representation in it.
    #[error("invalid encoding: {0}")]
    Encoding(String),

    /// Reading the catalog from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Create a parse error at a 1-based line number.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias for catalog results.
pub type Result<T> = std::result::Result<T, CatalogError>;
