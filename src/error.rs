use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    #[error("Invalid section {token} in {spec}")]
    SpecSyntax { token: String, spec: String },

    #[error("Index {index} out of range (length {len}) in {spec}")]
    OutOfRange {
        index: usize,
        len: usize,
        spec: String,
    },

    #[error("Start {start} must be less than end {end} in {spec}")]
    Order {
        start: usize,
        end: usize,
        spec: String,
    },

    #[error("Failed to format code for {name}: {reason}")]
    Render { name: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),
}

impl DocError {
    pub fn doc_not_found(name: impl Into<String>) -> Self {
        DocError::NotFound {
            kind: "Doc",
            name: name.into(),
        }
    }

    pub fn example_not_found(name: impl Into<String>) -> Self {
        DocError::NotFound {
            kind: "Example",
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocError>;
