use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to decode product feed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected feed shape: {0}")]
    Shape(String),
}

pub type Result<T> = std::result::Result<T, Error>;
