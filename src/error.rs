use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unknown demographic factor: {0}")]
    UnknownFactor(String),

    #[error("Factor {0} is not binary; a t-test needs exactly two groups")]
    NotBinary(String),

    #[error("Not enough samples: needed at least {needed}, got {got}")]
    NotEnoughSamples { needed: usize, got: usize },

    #[error("All samples are identical; the test statistic is undefined")]
    ConstantInput,

    #[error("Invalid distribution parameters: {0}")]
    Distribution(String),
}

pub type Result<T> = std::result::Result<T, Error>;
