use anyhow::Result;
use clap::Args;
use restock_browser::{ApiSession, ChromeFinder, ChromeLauncher, ProfileDir};
use restock_core::{ProductFeed, ProductRecord, TrackedSet, in_stock};
use restock_notify::{TelegramNotifier, failure_message, restock_message};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// The user-facing page whose load establishes the shop session
const DEFAULT_LANDING_URL: &str = "https://shop.amul.com/en/browse/protein";

/// Product listing endpoint, with the field/filter query the storefront's
/// own scripts use
const DEFAULT_API_URL: &str = "https://shop.amul.com/api/1/entity/ms.products?fields[name]=1&fields[brand]=1&fields[categories]=1&fields[collections]=1&fields[alias]=1&fields[sku]=1&fields[price]=1&fields[compare_price]=1&fields[original_price]=1&fields[images]=1&fields[metafields]=1&fields[discounts]=1&fields[catalog_only]=1&fields[is_catalog]=1&fields[seller]=1&fields[available]=1&fields[inventory_quantity]=1&fields[net_quantity]=1&fields[num_reviews]=1&fields[avg_rating]=1&fields[inventory_low_stock_quantity]=1&fields[inventory_allow_out_of_stock]=1&fields[default_variant]=1&fields[variants]=1&fields[lp_seller_ids]=1&filters[0][field]=categories&filters[0][value][0]=protein&filters[0][operator]=in&filters[0][original]=1&facets=true&facetgroup=default_category_facet&limit=32&total=1&start=0&cdc=1m&substore=66506004aa64743ceefbed25";

const DEFAULT_SKUS: [&str; 4] = ["WPCCP01_01", "WPCCP02_01", "WPCCP03_01", "WPCCP05_02"];

#[derive(Args)]
pub struct CheckArgs {
    /// Landing page loaded first to establish the shop session
    #[arg(long, default_value = DEFAULT_LANDING_URL)]
    pub landing_url: Url,

    /// Product listing endpoint fetched from inside the page
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: Url,

    /// SKU to alert on (repeatable)
    #[arg(long = "sku", value_name = "SKU", default_values_t = DEFAULT_SKUS.map(String::from))]
    pub skus: Vec<String>,

    /// Seconds to wait after page load before fetching the API
    #[arg(long, default_value_t = 15)]
    pub settle_secs: u64,

    /// Path to the Chrome binary (found automatically if omitted)
    #[arg(long)]
    pub chrome_path: Option<PathBuf>,

    /// Named profile under ~/.restock/profiles, keeping session cookies
    /// between polls (temporary profile if omitted)
    #[arg(long)]
    pub profile: Option<String>,

    /// Run Chrome with a visible window
    #[arg(long)]
    pub headful: bool,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true, default_value = "")]
    pub bot_token: String,

    /// Telegram chat id
    #[arg(long, env = "TELEGRAM_CHAT_ID", hide_env_values = true, default_value = "")]
    pub chat_id: String,

    /// Print matches without sending Telegram messages
    #[arg(long)]
    pub dry_run: bool,
}

/// What one poll sent, for the run summary
struct Dispatch {
    alerts: usize,
    failure_reported: bool,
}

pub fn execute(args: CheckArgs) -> Result<()> {
    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(args));

    // Explicitly shutdown runtime with timeout to prevent hanging on blocking tasks
    runtime.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}

async fn run(args: CheckArgs) -> Result<()> {
    use console::style;

    // Step 1: Find Chrome binary
    println!("🔍 Locating Chrome...");
    let finder = ChromeFinder::new(args.chrome_path.clone());
    let chrome_binary = finder.find()?;
    println!("✅ Found Chrome at: {}", chrome_binary.display());

    // Step 2: Setup profile
    let profile = if let Some(name) = &args.profile {
        let profile_path = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
            .join(".restock")
            .join("profiles")
            .join(name);

        println!("📁 Using profile: {}", profile_path.display());
        ProfileDir::persistent(profile_path)?
    } else {
        println!("📁 Using temporary profile");
        ProfileDir::temporary()?
    };

    // Step 3: Launch Chrome
    let launcher = ChromeLauncher::new(
        chrome_binary,
        profile.path().to_path_buf(),
        !args.headful,
    );
    let debugging_port = launcher.debugging_port();

    println!("🚀 Launching Chrome...");
    let chrome_process = launcher.launch()?;

    // Step 4: Drive the session - landing page, settle wait, in-page fetch
    let session = ApiSession::new(debugging_port, Duration::from_secs(args.settle_secs));

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message(format!(
        "Loading {} and settling for {}s...",
        args.landing_url, args.settle_secs
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let fetched = session
        .fetch_api(args.landing_url.as_str(), args.api_url.as_str())
        .await;

    spinner.finish_and_clear();

    // Step 5: Chrome has served its purpose either way; reap it before reporting
    println!("🧹 Closing browser");
    let _ = tokio::task::spawn_blocking(move || {
        let mut child = chrome_process;
        let _ = child.kill();
        child.wait()
    })
    .await;

    // Step 6: Decode, filter, notify
    let tracked = TrackedSet::new(args.skus.iter().cloned());
    let outcome = fetched
        .map_err(|e| e.to_string())
        .and_then(|value| ProductFeed::from_value(value).map_err(|e| e.to_string()));

    if let Ok(products) = &outcome {
        println!("📦 Feed returned {} products", products.len());
    }

    if args.dry_run {
        match outcome {
            Ok(products) => {
                let matches = in_stock(&products, &tracked);
                println!(
                    "{}",
                    style(format!("{} tracked product(s) in stock", matches.len())).bold()
                );
                for product in &matches {
                    println!(
                        "  {} {} (qty {}, ₹{})",
                        style("✅").green(),
                        product.name.trim(),
                        product.inventory_quantity,
                        product.price
                    );
                }
            }
            Err(detail) => {
                println!("{}", style(format!("❌ Poll failed: {}", detail)).red());
            }
        }
    } else {
        let notifier = TelegramNotifier::new(args.bot_token.clone(), args.chat_id.clone());
        let sent = dispatch(outcome, &tracked, &notifier, args.landing_url.as_str()).await;

        if sent.failure_reported {
            println!("{}", style("❌ Poll failed - error reported to Telegram").red());
        } else {
            println!("📨 {} alert(s) sent", sent.alerts);
        }
    }

    println!("🕒 Checked at {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    Ok(())
}

/// Turn a poll outcome into Telegram traffic: one message per in-stock
/// tracked product, or a single error report when the poll never produced a
/// product list. Send failures are logged and swallowed.
async fn dispatch(
    outcome: std::result::Result<Vec<ProductRecord>, String>,
    tracked: &TrackedSet,
    notifier: &TelegramNotifier,
    shop_url: &str,
) -> Dispatch {
    match outcome {
        Ok(products) => {
            for product in products.iter().filter(|p| tracked.contains(&p.sku)) {
                tracing::info!(
                    "Checking: '{}' | Available: {} | Quantity: {}",
                    product.name.trim(),
                    product.available,
                    product.inventory_quantity
                );
                if !(product.available && product.inventory_quantity > 0) {
                    tracing::info!("'{}' is out of stock", product.name.trim());
                }
            }

            let matches = in_stock(&products, tracked);
            for product in &matches {
                send_or_log(notifier, &restock_message(product, shop_url)).await;
            }

            Dispatch {
                alerts: matches.len(),
                failure_reported: false,
            }
        }
        Err(detail) => {
            tracing::error!("Poll failed: {}", detail);
            send_or_log(notifier, &failure_message(&detail)).await;

            Dispatch {
                alerts: 0,
                failure_reported: true,
            }
        }
    }
}

async fn send_or_log(notifier: &TelegramNotifier, text: &str) {
    if let Err(e) = notifier.send(text).await {
        tracing::warn!("Failed to send Telegram message: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn notifier_for(server: &MockServer) -> TelegramNotifier {
        TelegramNotifier::with_api_base("token", "42", server.base_url())
    }

    fn record(sku: &str, available: bool, qty: i64) -> ProductRecord {
        ProductRecord {
            sku: sku.to_string(),
            name: format!("Product {}", sku),
            available,
            inventory_quantity: qty,
            price: 1999.0,
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_one_alert_per_in_stock_match() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/bottoken/sendMessage");
            then.status(200).body(r#"{"ok":true}"#);
        });

        let tracked = TrackedSet::new(["WPCCP01_01", "WPCCP02_01"]);
        let products = vec![
            record("WPCCP01_01", true, 5),
            record("WPCCP02_01", false, 5), // tracked but unavailable
            record("WPCCP03_01", true, 5),  // in stock but untracked
        ];

        let sent = dispatch(
            Ok(products),
            &tracked,
            &notifier_for(&server),
            "https://shop.example",
        )
        .await;

        assert_eq!(sent.alerts, 1);
        assert!(!sent.failure_reported);
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_dispatch_alert_carries_name_price_and_quantity() {
        let product = ProductRecord {
            sku: "WPCCP01_01".to_string(),
            name: "Whey Protein, 32 g | Pack of 30 Sachets".to_string(),
            available: true,
            inventory_quantity: 5,
            price: 1999.0,
        };
        let expected = restock_message(&product, "https://shop.example");
        assert!(expected.contains("In Stock"));
        assert!(expected.contains("1999"));
        assert!(expected.contains("5"));

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/bottoken/sendMessage")
                .query_param("chat_id", "42")
                .query_param("text", expected.clone());
            then.status(200).body(r#"{"ok":true}"#);
        });

        let tracked = TrackedSet::new(["WPCCP01_01"]);
        dispatch(
            Ok(vec![product]),
            &tracked,
            &notifier_for(&server),
            "https://shop.example",
        )
        .await;

        mock.assert();
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_exactly_once() {
        let server = MockServer::start();
        let error_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/bottoken/sendMessage")
                .query_param("text", failure_message("browser exploded"));
            then.status(200).body(r#"{"ok":true}"#);
        });
        let catch_all = server.mock(|when, then| {
            when.method(GET).path("/bottoken/sendMessage");
            then.status(200).body(r#"{"ok":true}"#);
        });

        let tracked = TrackedSet::new(["WPCCP01_01"]);
        let sent = dispatch(
            Err("browser exploded".to_string()),
            &tracked,
            &notifier_for(&server),
            "https://shop.example",
        )
        .await;

        assert_eq!(sent.alerts, 0);
        assert!(sent.failure_reported);
        error_mock.assert_hits(1);
        catch_all.assert_hits(0);
    }

    #[tokio::test]
    async fn test_empty_feed_sends_nothing() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/bottoken/sendMessage");
            then.status(200).body(r#"{"ok":true}"#);
        });

        let tracked = TrackedSet::new(DEFAULT_SKUS);
        let sent = dispatch(
            Ok(vec![]),
            &tracked,
            &notifier_for(&server),
            "https://shop.example",
        )
        .await;

        assert_eq!(sent.alerts, 0);
        assert!(!sent.failure_reported);
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_send_failures_are_swallowed() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/bottoken/sendMessage");
            then.status(500).body("upstream sad");
        });

        let tracked = TrackedSet::new(["WPCCP01_01"]);
        let sent = dispatch(
            Ok(vec![record("WPCCP01_01", true, 2)]),
            &tracked,
            &notifier_for(&server),
            "https://shop.example",
        )
        .await;

        // The attempt happened and the run carried on
        assert_eq!(sent.alerts, 1);
        mock.assert_hits(1);
    }
}
