mod error;
mod message;
mod telegram;

pub use error::{Error, Result};
pub use message::{failure_message, restock_message};
pub use telegram::TelegramNotifier;
