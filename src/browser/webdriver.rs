use crate::browser::session::{BrowserSession, SessionError};
use crate::config::{MAX_WAIT_TIMEOUT_SECS, ScraperConfig};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::wd::WebDriverCompatibleCommand;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::Instant;

const SCROLL_INTO_VIEW_SCRIPT: &str = "arguments[0].scrollIntoView({block: 'center'});";

/// Endpoints tried when the configured WebDriver URL refuses the connection
const FALLBACK_WEBDRIVER_URLS: [&str; 2] = [
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// How often bounded waits re-check their condition
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A Chrome session driven through a WebDriver server
pub struct WebDriverSession {
    client: Option<Client>,
}

impl WebDriverSession {
    /// Start a new browser session with the anti-detection options applied.
    ///
    /// Tries `config.webdriver_url` first, then the common local defaults.
    pub async fn connect(config: &ScraperConfig) -> Result<Self, SessionError> {
        let mut urls = vec![config.webdriver_url.as_str()];
        urls.extend(
            FALLBACK_WEBDRIVER_URLS
                .iter()
                .filter(|url| **url != config.webdriver_url),
        );

        let mut last_error = None;
        for url in urls {
            match ClientBuilder::native()
                .capabilities(chrome_capabilities(config))
                .connect(url)
                .await
            {
                Ok(client) => {
                    ::log::info!("Connected to WebDriver at {}", url);
                    return Ok(Self {
                        client: Some(client),
                    });
                }
                Err(e) => {
                    ::log::debug!("Failed to connect to WebDriver at {}: {}", url, e);
                    last_error = Some(SessionError::Connect {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(last_error.unwrap_or_else(|| SessionError::Connect {
            url: config.webdriver_url.clone(),
            reason: "no WebDriver URL to try".to_string(),
        }))
    }

    fn client(&self) -> Result<&Client, SessionError> {
        self.client
            .as_ref()
            .ok_or_else(|| SessionError::Command("session already closed".to_string()))
    }
}

/// Chrome capabilities: custom user agent, no automation switches or banner
pub fn chrome_capabilities(config: &ScraperConfig) -> Map<String, Value> {
    let mut args = vec![
        format!("--user-agent={}", config.user_agent),
        "--disable-blink-features=AutomationControlled".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }

    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": args,
            "excludeSwitches": ["enable-automation"],
            "useAutomationExtension": false,
        }),
    );
    caps
}

/// A Chrome DevTools Protocol call tunnelled through chromedriver's
/// `goog/cdp/execute` extension endpoint
#[derive(Debug)]
struct CdpCommand {
    cmd: &'static str,
    params: Value,
}

impl WebDriverCompatibleCommand for CdpCommand {
    fn endpoint(
        &self,
        base_url: &url::Url,
        session_id: Option<&str>,
    ) -> Result<url::Url, url::ParseError> {
        let session_id = session_id.ok_or(url::ParseError::EmptyHost)?;
        base_url
            .join(&format!("session/{}/", session_id))?
            .join("goog/cdp/execute")
    }

    fn method_and_body(&self, _request_url: &url::Url) -> (http::Method, Option<String>) {
        let body = json!({ "cmd": self.cmd, "params": self.params });
        (http::Method::POST, Some(body.to_string()))
    }
}

/// `now + timeout`, saturating instead of overflowing the clock
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(Duration::from_secs(MAX_WAIT_TIMEOUT_SECS)))
        .unwrap_or(now)
}

fn command_error(e: CmdError) -> SessionError {
    SessionError::Command(e.to_string())
}

/// Displayed and enabled; errors (e.g. a stale element mid-render) count as not ready
async fn is_clickable(element: &Element) -> bool {
    matches!(element.is_displayed().await, Ok(true))
        && matches!(element.is_enabled().await, Ok(true))
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Element = Element;

    async fn add_init_script(&mut self, script: &str) -> Result<(), SessionError> {
        let cmd = CdpCommand {
            cmd: "Page.addScriptToEvaluateOnNewDocument",
            params: json!({ "source": script }),
        };
        self.client()?.issue_cmd(cmd).await.map_err(command_error)?;
        ::log::debug!("Registered init script for new documents");
        Ok(())
    }

    async fn goto(&mut self, url: &str) -> Result<(), SessionError> {
        ::log::debug!("Navigating to {}", url);
        self.client()?.goto(url).await.map_err(command_error)
    }

    async fn find_elements(&mut self, css: &str) -> Result<Vec<Element>, SessionError> {
        self.client()?
            .find_all(Locator::Css(css))
            .await
            .map_err(command_error)
    }

    async fn wait_for_elements(
        &mut self,
        css: &str,
        timeout: Duration,
    ) -> Result<Vec<Element>, SessionError> {
        let deadline = deadline_after(timeout);
        loop {
            let found = self.find_elements(css).await?;
            if !found.is_empty() {
                ::log::trace!("{} elements match {}", found.len(), css);
                return Ok(found);
            }
            if Instant::now() >= deadline {
                return Err(SessionError::Timeout {
                    what: format!("elements matching `{}`", css),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_clickable_link(
        &mut self,
        text: &str,
        timeout: Duration,
    ) -> Result<Element, SessionError> {
        let deadline = deadline_after(timeout);
        loop {
            match self.client()?.find(Locator::LinkText(text)).await {
                Ok(element) => {
                    if is_clickable(&element).await {
                        return Ok(element);
                    }
                }
                Err(e) if e.is_no_such_element() => {}
                Err(e) => return Err(command_error(e)),
            }
            if Instant::now() >= deadline {
                return Err(SessionError::Timeout {
                    what: format!("clickable link `{}`", text),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn scroll_into_view(&mut self, element: &Element) -> Result<(), SessionError> {
        let arg = serde_json::to_value(element)
            .map_err(|e| SessionError::Command(format!("cannot pass element to script: {e}")))?;
        self.client()?
            .execute(SCROLL_INTO_VIEW_SCRIPT, vec![arg])
            .await
            .map_err(command_error)?;
        Ok(())
    }

    async fn click(&mut self, element: &Element) -> Result<(), SessionError> {
        element.click().await.map_err(command_error)
    }

    async fn execute(&mut self, script: &str) -> Result<(), SessionError> {
        self.client()?
            .execute(script, vec![])
            .await
            .map_err(command_error)?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, SessionError> {
        self.client()?.source().await.map_err(command_error)
    }

    async fn back(&mut self) -> Result<(), SessionError> {
        self.client()?.back().await.map_err(command_error)
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        match self.client.take() {
            Some(client) => {
                ::log::debug!("Closing WebDriver session");
                client.close().await.map_err(command_error)
            }
            None => Ok(()),
        }
    }
}
