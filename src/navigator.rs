use crate::browser::{BrowserSession, SessionError};
use crate::config::{ScraperConfig, clamp_limit};
use crate::parsers::{extract_project_info, extract_promoter_info};
use crate::results::{CombinedRecord, FetchReport, ItemWarning};
use std::time::Duration;
use thiserror::Error;

/// Hides the `navigator.webdriver` flag from page scripts
pub const HIDE_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// Failures that end a run early
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not start browser session: {0}")]
    Connect(#[source] SessionError),

    #[error("failed to load listing page {url}: {source}")]
    ListingLoad {
        url: String,
        #[source]
        source: SessionError,
    },

    #[error("no view controls matching `{selector}` appeared within {timeout:?}")]
    NoViewControls { selector: String, timeout: Duration },

    #[error("browser session failed on item {item}: {source}")]
    Session {
        item: usize,
        #[source]
        source: SessionError,
    },
}

/// Where the browser is in the list → detail → tab → back cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavState {
    /// Session open, nothing loaded yet
    Idle,
    ListLoaded,
    DetailOpen,
    PromoterTabOpen,
    RecordCaptured,
}

impl NavState {
    fn can_advance_to(self, next: NavState) -> bool {
        use NavState::*;
        matches!(
            (self, next),
            (Idle, ListLoaded)
                | (ListLoaded, DetailOpen)
                | (DetailOpen, PromoterTabOpen)
                | (DetailOpen, ListLoaded)
                | (PromoterTabOpen, RecordCaptured)
                | (RecordCaptured, ListLoaded)
        )
    }
}

/// Result of visiting one listing entry
#[derive(Debug)]
enum ItemOutcome {
    Captured(CombinedRecord),
    Skipped(ItemWarning),
}

type ProgressFn = Box<dyn FnMut(usize, usize) + Send>;

/// Walks the registry listing one entry at a time.
///
/// The navigator owns its browser session for the whole run. `fetch_records`
/// consumes it and calls `close` on every return path, including fatal
/// errors. If the future is dropped mid-run or a panic unwinds through it,
/// `close` is not awaited; the session is then only released when the
/// underlying client is dropped.
///
/// The scroll and render pauses are fixed sleeps on top of the bounded waits.
/// They paper over animations the waits cannot observe and are the main
/// source of run-to-run variation.
pub struct Navigator<S: BrowserSession> {
    session: S,
    config: ScraperConfig,
    state: NavState,
    progress: Option<ProgressFn>,
    /// Script registered for every new document, so no per-navigation re-run
    init_script_registered: bool,
}

impl<S: BrowserSession> Navigator<S> {
    pub fn new(session: S, config: ScraperConfig) -> Self {
        Self {
            session,
            config,
            state: NavState::Idle,
            progress: None,
            init_script_registered: false,
        }
    }

    /// Called with (1-based item, items to visit) before each entry is visited
    pub fn with_progress(mut self, progress: impl FnMut(usize, usize) + Send + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Visit up to `limit` listing entries (clamped to `1..=MAX_ITEMS`) and
    /// collect one record per entry whose promoter tab could be opened.
    ///
    /// Records keep visitation order. Entries that fail recoverably become
    /// warnings; a fatal failure stops the run and keeps whatever was
    /// captured before it.
    pub async fn fetch_records(mut self, limit: usize) -> FetchReport {
        let mut report = FetchReport::default();

        if let Err(e) = self.run(clamp_limit(limit), &mut report).await {
            ::log::error!("Run aborted: {}", e);
            report.failure = Some(e);
        }

        if let Err(e) = self.session.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }

        ::log::info!(
            "Collected {} records ({} skipped)",
            report.records.len(),
            report.warnings.len()
        );
        report
    }

    async fn run(&mut self, limit: usize, report: &mut FetchReport) -> Result<(), FetchError> {
        self.register_hide_automation().await;

        let url = self.config.listing_url.clone();
        ::log::info!("Opening listing page {}", url);

        let loaded = match self.session.goto(&url).await {
            Ok(()) => self.hide_automation().await,
            Err(e) => Err(e),
        };
        loaded.map_err(|source| FetchError::ListingLoad {
            url: url.clone(),
            source,
        })?;

        let timeout = self.config.wait_timeout();
        let controls = match self
            .session
            .wait_for_elements(&self.config.view_selector, timeout)
            .await
        {
            Ok(controls) => controls,
            Err(e) if e.is_timeout() => {
                return Err(FetchError::NoViewControls {
                    selector: self.config.view_selector.clone(),
                    timeout,
                });
            }
            Err(source) => return Err(FetchError::ListingLoad { url, source }),
        };
        self.advance(NavState::ListLoaded);

        let total = limit.min(controls.len());
        ::log::info!(
            "Found {} view controls, visiting {}",
            controls.len(),
            total
        );

        for index in 0..total {
            let item = index + 1;
            if let Some(progress) = self.progress.as_mut() {
                progress(item, total);
            }

            match self.visit(index).await {
                Ok(ItemOutcome::Captured(record)) => {
                    ::log::info!("[{}] Captured {:?}", item, record.project.name);
                    report.records.push(record);
                }
                Ok(ItemOutcome::Skipped(warning)) => {
                    ::log::warn!("{}", warning);
                    report.warnings.push(warning);
                }
                Err(source) => return Err(FetchError::Session { item, source }),
            }
        }

        Ok(())
    }

    /// One pass through the cycle for the entry at `index`, starting and
    /// ending on the listing
    async fn visit(&mut self, index: usize) -> Result<ItemOutcome, SessionError> {
        let item = index + 1;
        let timeout = self.config.wait_timeout();

        // The control list is rebuilt after every navigation
        let controls = self
            .session
            .wait_for_elements(&self.config.view_selector, timeout)
            .await?;
        let Some(control) = controls.get(index) else {
            return Ok(ItemOutcome::Skipped(ItemWarning {
                item,
                message: format!(
                    "View control missing from listing ({} present)",
                    controls.len()
                ),
            }));
        };

        self.session.scroll_into_view(control).await?;
        pause(self.config.scroll_pause()).await;
        self.session.click(control).await?;
        self.hide_automation().await?;
        self.advance(NavState::DetailOpen);

        pause(self.config.render_pause()).await;
        let project = extract_project_info(&self.session.page_source().await?);

        if let Err(e) = self.open_promoter_tab(timeout).await {
            self.return_to_listing().await?;
            return Ok(ItemOutcome::Skipped(ItemWarning {
                item,
                message: format!("Unable to access promoter tab: {}", e),
            }));
        }
        self.advance(NavState::PromoterTabOpen);

        pause(self.config.render_pause()).await;
        let promoter = extract_promoter_info(&self.session.page_source().await?);
        self.advance(NavState::RecordCaptured);

        let record = CombinedRecord::merge(project, promoter);
        self.return_to_listing().await?;
        Ok(ItemOutcome::Captured(record))
    }

    async fn open_promoter_tab(&mut self, timeout: Duration) -> Result<(), SessionError> {
        let tab = self
            .session
            .wait_for_clickable_link(&self.config.promoter_tab_text, timeout)
            .await?;
        self.session.scroll_into_view(&tab).await?;
        pause(self.config.scroll_pause()).await;
        self.session.click(&tab).await
    }

    async fn return_to_listing(&mut self) -> Result<(), SessionError> {
        self.session.back().await?;
        self.hide_automation().await?;
        self.advance(NavState::ListLoaded);
        Ok(())
    }

    fn advance(&mut self, next: NavState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal navigation step {:?} -> {:?}",
            self.state,
            next
        );
        ::log::trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Register the flag-hiding script before any page loads, so it runs
    /// ahead of the site's own scripts
    async fn register_hide_automation(&mut self) {
        match self.session.add_init_script(HIDE_WEBDRIVER_SCRIPT).await {
            Ok(()) => self.init_script_registered = true,
            Err(e) => ::log::warn!(
                "Could not register init script ({}); hiding the automation flag after each navigation instead",
                e
            ),
        }
    }

    /// Fallback when no init script is registered: each document starts fresh
    async fn hide_automation(&mut self) -> Result<(), SessionError> {
        if self.init_script_registered {
            return Ok(());
        }
        self.session.execute(HIDE_WEBDRIVER_SCRIPT).await
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
