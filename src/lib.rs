// Re-export modules
pub mod browser;
pub mod config;
pub mod export;
pub mod navigator;
pub mod parsers;
pub mod results;

// Re-export commonly used types for convenience
pub use browser::{BrowserSession, SessionError, WebDriverSession};
pub use config::{MAX_ITEMS, ScraperConfig};
pub use navigator::{FetchError, Navigator};
pub use parsers::{extract_project_info, extract_promoter_info};
pub use results::{CombinedRecord, FetchReport, ProjectRecord, PromoterRecord, ResultSet};

/// Connect to the configured WebDriver server and collect up to `limit`
/// records from the registry listing.
///
/// Never panics on missing fields or unreachable servers: every failure ends
/// up in the returned report. The browser session is closed before this
/// returns.
pub async fn fetch_records(config: &ScraperConfig, limit: usize) -> FetchReport {
    fetch_records_with_progress(config, limit, |_, _| {}).await
}

/// Like [`fetch_records`], calling `progress(item, total)` before each
/// listing entry is visited
pub async fn fetch_records_with_progress(
    config: &ScraperConfig,
    limit: usize,
    progress: impl FnMut(usize, usize) + Send + 'static,
) -> FetchReport {
    match WebDriverSession::connect(config).await {
        Ok(session) => {
            Navigator::new(session, config.clone())
                .with_progress(progress)
                .fetch_records(limit)
                .await
        }
        Err(e) => {
            ::log::error!("Failed to start browser session: {}", e);
            FetchReport::failed(FetchError::Connect(e))
        }
    }
}
