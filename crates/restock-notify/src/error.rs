use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API rejected the message: HTTP {0}")]
    Api(u16),
}

pub type Result<T> = std::result::Result<T, Error>;
