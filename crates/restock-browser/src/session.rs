use crate::{Error, Result};
use chromiumoxide::browser::Browser;
use futures::StreamExt;
use std::time::Duration;

/// Drives a page in the launched Chrome to fetch the product API.
///
/// The landing page is loaded first so the site establishes its session
/// cookies, then the API is fetched from inside the page. Running the fetch
/// in-page means the request carries exactly the cookies and headers the
/// storefront expects.
pub struct ApiSession {
    debugging_port: u16,
    settle_delay: Duration,
}

impl ApiSession {
    /// Create a session against a Chrome instance with remote debugging on
    /// the given port. `settle_delay` is waited out after the landing page
    /// loads, before the API fetch runs.
    pub fn new(debugging_port: u16, settle_delay: Duration) -> Self {
        Self {
            debugging_port,
            settle_delay,
        }
    }

    /// Load `landing_url`, wait out the settle delay, then run an in-page
    /// fetch of `api_url` and return the decoded JSON body.
    ///
    /// Single attempt: any failure along the way aborts the poll.
    pub async fn fetch_api(&self, landing_url: &str, api_url: &str) -> Result<serde_json::Value> {
        tracing::info!(
            "CDP session: connecting to Chrome on port {}",
            self.debugging_port
        );

        // Connect via CDP with retries (Chrome may not be fully ready)
        let cdp_url = format!("http://localhost:{}", self.debugging_port);
        let (browser, mut handler) = {
            let mut retries = 5;
            loop {
                tracing::debug!("Attempting CDP connection to {}...", cdp_url);
                match Browser::connect(&cdp_url).await {
                    Ok(conn) => {
                        tracing::info!("CDP connection established");
                        break conn;
                    }
                    Err(e) => {
                        retries -= 1;
                        if retries == 0 {
                            return Err(Error::Cdp(format!(
                                "Failed to connect to Chrome after 5 attempts: {}",
                                e
                            )));
                        }
                        tracing::debug!("CDP connection attempt failed, retrying... ({} left)", retries);
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                }
            }
        };

        // The handler stream must be polled for any CDP command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let result = self.drive_page(&browser, landing_url, api_url).await;

        handler_task.abort();
        result
    }

    async fn drive_page(
        &self,
        browser: &Browser,
        landing_url: &str,
        api_url: &str,
    ) -> Result<serde_json::Value> {
        // Chrome needs a beat to create its initial target
        tokio::time::sleep(Duration::from_millis(500)).await;

        let page = if let Some(page) = browser.pages().await?.first() {
            page.clone()
        } else {
            browser.new_page("about:blank").await?
        };

        tracing::info!("Navigating to {}", landing_url);
        page.goto(landing_url).await?;
        page.wait_for_navigation().await?;

        tracing::info!(
            "Page loaded, settling {}s so the site finishes its own requests",
            self.settle_delay.as_secs()
        );
        tokio::time::sleep(self.settle_delay).await;

        tracing::info!("Executing in-page fetch of the product API");
        let value: serde_json::Value = page
            .evaluate_function(fetch_script(api_url))
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?
            .into_value()
            .map_err(|e| Error::Fetch(format!("API body was not JSON: {}", e)))?;

        Ok(value)
    }
}

/// In-page fetch wrapper around the API URL. Rejecting on non-2xx turns an
/// HTTP-level failure into an evaluation error instead of a garbage body.
fn fetch_script(api_url: &str) -> String {
    format!(
        "async () => {{\n\
             const res = await fetch('{}', {{ credentials: 'include' }});\n\
             if (!res.ok) {{ throw new Error('API responded ' + res.status); }}\n\
             return await res.json();\n\
         }}",
        escape_single_quoted(api_url)
    )
}

/// Escape a string for inclusion in a single-quoted JS literal
fn escape_single_quoted(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_holds_configuration() {
        let session = ApiSession::new(9222, Duration::from_secs(15));

        assert_eq!(session.debugging_port, 9222);
        assert_eq!(session.settle_delay, Duration::from_secs(15));
    }

    #[test]
    fn test_fetch_script_embeds_url_and_credentials() {
        let script = fetch_script("https://shop.example/api/1/entity/ms.products?limit=32");

        assert!(script.contains("https://shop.example/api/1/entity/ms.products?limit=32"));
        assert!(script.contains("credentials: 'include'"));
        assert!(script.starts_with("async () =>"));
    }

    #[test]
    fn test_fetch_script_escapes_quotes() {
        let script = fetch_script("https://shop.example/api?q='protein'");

        assert!(script.contains("\\'protein\\'"));
    }

    // Full session tests need a running Chrome instance and are covered by
    // exercising the `check` command against a real browser.
}
