use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Largest number of listing entries a single run will visit
pub const MAX_ITEMS: usize = 20;

/// Upper bound on any single bounded wait, in seconds
pub const MAX_WAIT_TIMEOUT_SECS: u64 = 600;

/// Configuration for a registry scraping run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Project listing page
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default)]
    pub headless: bool,

    /// User agent announced by the browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// CSS selector for the per-project "view" controls on the listing
    #[serde(default = "default_view_selector")]
    pub view_selector: String,

    /// Link text of the promoter tab on the detail view
    #[serde(default = "default_promoter_tab_text")]
    pub promoter_tab_text: String,

    /// Upper bound for every wait-on-condition, in seconds
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Pause after scrolling an element into view, in milliseconds
    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,

    /// Pause for content to render before taking a snapshot, in milliseconds
    #[serde(default = "default_render_pause_ms")]
    pub render_pause_ms: u64,
}

/// Default value for listing_url
fn default_listing_url() -> String {
    "https://rera.odisha.gov.in/projects/project-list".to_string()
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_view_selector() -> String {
    "a.btn.btn-primary".to_string()
}

fn default_promoter_tab_text() -> String {
    "Promoter Details".to_string()
}

fn default_wait_timeout_secs() -> u64 {
    15
}

fn default_scroll_pause_ms() -> u64 {
    1000
}

fn default_render_pause_ms() -> u64 {
    3000
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            webdriver_url: default_webdriver_url(),
            headless: false,
            user_agent: default_user_agent(),
            view_selector: default_view_selector(),
            promoter_tab_text: default_promoter_tab_text(),
            wait_timeout_secs: default_wait_timeout_secs(),
            scroll_pause_ms: default_scroll_pause_ms(),
            render_pause_ms: default_render_pause_ms(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the WebDriver URL with the WEBDRIVER_URL environment variable if provided
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    /// Reject URLs that cannot be parsed
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        Url::parse(&self.listing_url)
            .map_err(|e| format!("invalid listing_url {:?}: {}", self.listing_url, e))?;
        Url::parse(&self.webdriver_url)
            .map_err(|e| format!("invalid webdriver_url {:?}: {}", self.webdriver_url, e))?;
        if self.wait_timeout_secs > MAX_WAIT_TIMEOUT_SECS {
            return Err(format!(
                "wait_timeout_secs {} exceeds the maximum of {}",
                self.wait_timeout_secs, MAX_WAIT_TIMEOUT_SECS
            )
            .into());
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs.min(MAX_WAIT_TIMEOUT_SECS))
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn render_pause(&self) -> Duration {
        Duration::from_millis(self.render_pause_ms)
    }
}

/// Clamp a requested item count into `1..=MAX_ITEMS`
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_ITEMS)
}
