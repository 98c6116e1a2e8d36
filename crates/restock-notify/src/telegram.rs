use crate::{Error, Result};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API client for one chat.
///
/// Credentials are not validated up front; a missing or bad token simply
/// produces a failed send, which callers log and move past.
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
    api_base: String,
}

impl TelegramNotifier {
    /// Create a notifier against the public Telegram API
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_api_base(bot_token, chat_id, DEFAULT_API_BASE)
    }

    /// Create a notifier against a different API host. Tests aim this at a
    /// local mock server.
    pub fn with_api_base(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: api_base.into(),
        }
    }

    /// Send one Markdown-formatted message to the configured chat.
    ///
    /// No retry and no delivery confirmation beyond the HTTP status.
    pub async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("chat_id", self.chat_id.as_str()),
                ("text", text),
                ("parse_mode", "Markdown"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api(status.as_u16()));
        }

        tracing::info!("Telegram notification sent: {}", text);
        Ok(())
    }
}
