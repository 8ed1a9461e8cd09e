use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("index {index} out of bounds for array of length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("not an object or array")]
    NotObjectOrArray,

    /// Also returned by `delete` when the final key is missing.
    #[error("not an object")]
    NotObject,

    #[error("not an array")]
    NotArray,

    #[error("encountered value collision whilst building path at: {segment}")]
    PathCollision { segment: String },

    #[error("missing intermediate segment: {segment}")]
    MissingSegment { segment: String },

    #[error("invalid file path")]
    InvalidPath,

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl TreeError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
