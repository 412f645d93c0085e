use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures raised at the browser boundary
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to start WebDriver session at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("WebDriver command failed: {0}")]
    Command(String),
}

impl SessionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }
}

/// The operations the navigator needs from a controllable browser.
///
/// Implementations own exactly one live session. `close` must be called once
/// the session is no longer needed; the navigator guarantees that on every
/// exit path.
#[async_trait]
pub trait BrowserSession: Send {
    /// Handle to an element on the current page
    type Element: Send + Sync;

    /// Register a script that runs in every new document before its own
    /// scripts. Drivers without such a hook return an error.
    async fn add_init_script(&mut self, script: &str) -> Result<(), SessionError>;

    /// Navigate to `url`
    async fn goto(&mut self, url: &str) -> Result<(), SessionError>;

    /// All elements currently matching a CSS selector
    async fn find_elements(&mut self, css: &str) -> Result<Vec<Self::Element>, SessionError>;

    /// Wait until at least one element matches `css`, then return every match
    async fn wait_for_elements(
        &mut self,
        css: &str,
        timeout: Duration,
    ) -> Result<Vec<Self::Element>, SessionError>;

    /// Wait until a link with exactly this text is displayed and enabled
    async fn wait_for_clickable_link(
        &mut self,
        text: &str,
        timeout: Duration,
    ) -> Result<Self::Element, SessionError>;

    /// Scroll an element to the middle of the viewport
    async fn scroll_into_view(&mut self, element: &Self::Element) -> Result<(), SessionError>;

    async fn click(&mut self, element: &Self::Element) -> Result<(), SessionError>;

    /// Run a script in the page, discarding its return value
    async fn execute(&mut self, script: &str) -> Result<(), SessionError>;

    /// Currently rendered markup
    async fn page_source(&mut self) -> Result<String, SessionError>;

    /// Go back one entry in history
    async fn back(&mut self) -> Result<(), SessionError>;

    /// Tear the session down
    async fn close(&mut self) -> Result<(), SessionError>;
}
