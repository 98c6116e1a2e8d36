use crate::{Error, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Desktop user agent presented to the shop. The storefront serves its
/// normal session flow to this UA; the headless default would not get one.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// Spawns and configures the Chrome process for one polling run
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    headless: bool,
    debugging_port: u16,
}

impl ChromeLauncher {
    /// Create a new ChromeLauncher
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf, headless: bool) -> Self {
        Self {
            chrome_path,
            profile_path,
            headless,
            debugging_port: 9222,
        }
    }

    /// Launch the Chrome process
    pub fn launch(&self) -> Result<Child> {
        Command::new(&self.chrome_path)
            .args(self.build_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))
    }

    /// Build Chrome command-line arguments
    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debugging_port),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--user-agent={}", USER_AGENT),
            format!("--user-data-dir={}", self.profile_path.display()),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
            args.push("--window-size=1920,1080".to_string());
        } else {
            args.push("--start-maximized".to_string());
        }

        args.push("about:blank".to_string());
        args
    }

    /// Get the debugging port
    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }
}
