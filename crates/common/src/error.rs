use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid token {token:?}: expected a number, an empty value, \"None\", or n<x>/p<x>")]
    InvalidToken { token: String },

    #[error("column {column}")]
    Column {
        column: usize,
        #[source]
        source: Box<ScaleError>,
    },

    #[error("invalid column range: {0}")]
    InvalidRange(String),

    #[error("settings line {line}: {reason}")]
    Settings { line: usize, reason: String },

    #[error("column {0} has no saved scaling parameters")]
    UnknownColumn(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ScaleError {
    /// Attach the 0-based column index a token error came from.
    pub fn in_column(self, column: usize) -> Self {
        ScaleError::Column {
            column,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaleError>;
