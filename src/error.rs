//! Error types for huffpack

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("empty input")]
    EmptyInput,

    #[error("output sink is not writable: {0}")]
    NotWritable(String),

    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    #[error("input too large: {size} bytes exceeds limit of {limit}")]
    InputTooLarge { size: usize, limit: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        CodecError::CorruptStream(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
