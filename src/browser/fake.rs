//! In-memory stand-in for a registry portal behind a browser session.

use crate::browser::session::{BrowserSession, SessionError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) struct FakeProject {
    pub name: String,
    pub rera: String,
    pub promoter: String,
    pub address: String,
    pub gst: String,
}

impl FakeProject {
    pub fn numbered(n: usize) -> Self {
        Self {
            name: format!("Project {n}"),
            rera: format!("RERA/2023/{n:03}"),
            promoter: format!("Promoter {n}"),
            address: format!("Plot {n}, Bhubaneswar"),
            gst: format!("21GST{n:04}"),
        }
    }

    fn detail_markup(&self) -> String {
        format!(
            r##"<html><body>
                <div class="details-project ms-3"><label>Project Name</label><strong>{}</strong></div>
                <div class="details-project ms-3"><label>RERA Regd. No.</label><strong>{}</strong></div>
                <ul><li><a href="#promoter">Promoter Details</a></li></ul>
            </body></html>"##,
            self.name, self.rera
        )
    }

    fn promoter_markup(&self) -> String {
        format!(
            r#"<html><body>
                <div><label>Company Name</label><strong>{}</strong></div>
                <div><label>Registered Office Address</label><strong>{}</strong></div>
                <div><label>GST No.</label><strong>{}</strong></div>
            </body></html>"#,
            self.promoter, self.address, self.gst
        )
    }
}

/// What the fake session was asked to do
#[derive(Debug, Default)]
pub(crate) struct SessionLog {
    /// Every call in order, by trait method name
    pub calls: Vec<&'static str>,
    pub init_scripts: Vec<String>,
    pub gotos: Vec<String>,
    pub scripts: Vec<String>,
    pub clicks: usize,
    pub backs: usize,
    pub closes: usize,
    /// Item indices whose detail view was opened, in order
    pub opened: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Blank,
    Listing,
    Detail(usize),
    Promoter(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FakeElement {
    View(usize),
    PromoterTab(usize),
}

pub(crate) struct FakeSession {
    projects: Vec<FakeProject>,
    /// Items whose promoter tab never becomes clickable
    pub missing_promoter_tab: HashSet<usize>,
    /// Listing never shows any view control
    pub empty_listing: bool,
    /// Listing page cannot be loaded at all
    pub unreachable: bool,
    /// Snapshot of this item's detail view fails as if the browser crashed
    pub crash_on_item: Option<usize>,
    /// Driver rejects init-script registration (not a Chromium driver)
    pub init_script_unsupported: bool,
    /// After this many `back()` calls the listing only shows this many controls
    pub shrink_listing: Option<(usize, usize)>,
    page: Page,
    log: Arc<Mutex<SessionLog>>,
}

impl FakeSession {
    pub fn with_projects(count: usize) -> Self {
        Self {
            projects: (1..=count).map(FakeProject::numbered).collect(),
            missing_promoter_tab: HashSet::new(),
            empty_listing: false,
            unreachable: false,
            crash_on_item: None,
            init_script_unsupported: false,
            shrink_listing: None,
            page: Page::Blank,
            log: Arc::new(Mutex::new(SessionLog::default())),
        }
    }

    /// Shared handle to the call log, still readable after the session is consumed
    pub fn log(&self) -> Arc<Mutex<SessionLog>> {
        Arc::clone(&self.log)
    }

    fn record(&self, call: &'static str) {
        self.log.lock().unwrap().calls.push(call);
    }

    fn visible_controls(&self) -> usize {
        match self.shrink_listing {
            Some((after_backs, remaining)) if self.log.lock().unwrap().backs >= after_backs => {
                remaining.min(self.projects.len())
            }
            _ => self.projects.len(),
        }
    }

    fn timeout(what: &str, timeout: Duration) -> SessionError {
        SessionError::Timeout {
            what: what.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Element = FakeElement;

    async fn add_init_script(&mut self, script: &str) -> Result<(), SessionError> {
        self.record("add_init_script");
        if self.init_script_unsupported {
            return Err(SessionError::Command("unknown command".to_string()));
        }
        self.log.lock().unwrap().init_scripts.push(script.to_string());
        Ok(())
    }

    async fn goto(&mut self, url: &str) -> Result<(), SessionError> {
        self.record("goto");
        self.log.lock().unwrap().gotos.push(url.to_string());
        if self.unreachable {
            return Err(SessionError::Command("net::ERR_NAME_NOT_RESOLVED".to_string()));
        }
        self.page = Page::Listing;
        Ok(())
    }

    async fn find_elements(&mut self, _css: &str) -> Result<Vec<FakeElement>, SessionError> {
        match self.page {
            Page::Listing if !self.empty_listing => {
                Ok((0..self.visible_controls()).map(FakeElement::View).collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn wait_for_elements(
        &mut self,
        css: &str,
        timeout: Duration,
    ) -> Result<Vec<FakeElement>, SessionError> {
        let found = self.find_elements(css).await?;
        if found.is_empty() {
            return Err(Self::timeout(css, timeout));
        }
        Ok(found)
    }

    async fn wait_for_clickable_link(
        &mut self,
        text: &str,
        timeout: Duration,
    ) -> Result<FakeElement, SessionError> {
        match self.page {
            Page::Detail(i)
                if text == "Promoter Details" && !self.missing_promoter_tab.contains(&i) =>
            {
                Ok(FakeElement::PromoterTab(i))
            }
            _ => Err(Self::timeout(text, timeout)),
        }
    }

    async fn scroll_into_view(&mut self, _element: &FakeElement) -> Result<(), SessionError> {
        Ok(())
    }

    async fn click(&mut self, element: &FakeElement) -> Result<(), SessionError> {
        self.record("click");
        self.page = match (self.page, element) {
            (Page::Listing, FakeElement::View(i)) => {
                self.log.lock().unwrap().opened.push(*i);
                Page::Detail(*i)
            }
            (Page::Detail(i), FakeElement::PromoterTab(j)) if i == *j => Page::Promoter(i),
            (page, element) => {
                return Err(SessionError::Command(format!(
                    "stale element {element:?} on {page:?}"
                )));
            }
        };
        self.log.lock().unwrap().clicks += 1;
        Ok(())
    }

    async fn execute(&mut self, script: &str) -> Result<(), SessionError> {
        self.record("execute");
        self.log.lock().unwrap().scripts.push(script.to_string());
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, SessionError> {
        match self.page {
            Page::Detail(i) if self.crash_on_item == Some(i) => {
                Err(SessionError::Command("chrome not reachable".to_string()))
            }
            Page::Detail(i) => Ok(self.projects[i].detail_markup()),
            Page::Promoter(i) => Ok(self.projects[i].promoter_markup()),
            Page::Listing | Page::Blank => Ok("<html><body></body></html>".to_string()),
        }
    }

    async fn back(&mut self) -> Result<(), SessionError> {
        self.record("back");
        self.log.lock().unwrap().backs += 1;
        self.page = match self.page {
            Page::Detail(_) | Page::Promoter(_) => Page::Listing,
            other => other,
        };
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.record("close");
        self.log.lock().unwrap().closes += 1;
        self.page = Page::Blank;
        Ok(())
    }
}
