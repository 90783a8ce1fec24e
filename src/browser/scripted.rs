//! Scripted page driver
//!
//! Serves canned documents from memory. A page may have several frames; each
//! scroll advances to the next one, imitating a listing that loads more
//! content as it is scrolled. The driver counts open pages, scrolls and
//! navigations so callers can inspect how a run used it.

use crate::browser::{Browser, BrowserPage};
use crate::ScrapeError;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a URL serves
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    frames: Vec<String>,
    delay: Duration,
    times_out: bool,
    failure: Option<String>,
}

impl PageScript {
    /// A static document
    pub fn html(content: impl Into<String>) -> Self {
        Self::frames(vec![content.into()])
    }

    /// A document that changes with each scroll; the last frame repeats
    pub fn frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Navigation that never completes in time
    pub fn timing_out() -> Self {
        Self {
            times_out: true,
            ..Self::default()
        }
    }

    /// Navigation that fails outright
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Holds navigation for `delay` before it resolves
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn frame(&self, index: usize) -> String {
        self.frames
            .get(index.min(self.frames.len().saturating_sub(1)))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct Counters {
    open: AtomicUsize,
    max_open: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    scrolls: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

/// Snapshot of how the driver was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverStats {
    /// Pages open right now
    pub open: usize,
    /// Highest number of pages open at the same time
    pub max_open: usize,
    pub opened: usize,
    pub closed: usize,
    pub scrolls: usize,
    /// Every URL navigated to, in order
    pub navigations: Vec<String>,
}

/// Browser serving scripted pages
#[derive(Debug, Clone, Default)]
pub struct ScriptedBrowser {
    pages: Arc<HashMap<String, PageScript>>,
    counters: Arc<Counters>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the script for `url`
    pub fn page(mut self, url: impl Into<String>, script: PageScript) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.into(), script);
        self
    }

    pub fn stats(&self) -> DriverStats {
        DriverStats {
            open: self.counters.open.load(Ordering::SeqCst),
            max_open: self.counters.max_open.load(Ordering::SeqCst),
            opened: self.counters.opened.load(Ordering::SeqCst),
            closed: self.counters.closed.load(Ordering::SeqCst),
            scrolls: self.counters.scrolls.load(Ordering::SeqCst),
            navigations: self
                .counters
                .navigations
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, ScrapeError> {
        let counters = &self.counters;
        counters.opened.fetch_add(1, Ordering::SeqCst);
        let open = counters.open.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_open.fetch_max(open, Ordering::SeqCst);

        Ok(Box::new(ScriptedPage {
            pages: Arc::clone(&self.pages),
            counters: Arc::clone(&self.counters),
            current: Mutex::new(None),
            closed: AtomicBool::new(false),
        }))
    }
}

struct ScriptedPage {
    pages: Arc<HashMap<String, PageScript>>,
    counters: Arc<Counters>,
    /// Loaded URL and current frame
    current: Mutex<Option<(String, usize)>>,
    closed: AtomicBool,
}

impl ScriptedPage {
    fn current_document(&self) -> Result<String, ScrapeError> {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let (url, frame) = current
            .as_ref()
            .ok_or_else(|| ScrapeError::Browser("no document loaded".to_string()))?;
        let script = self
            .pages
            .get(url)
            .ok_or_else(|| ScrapeError::Browser(format!("no script for {}", url)))?;
        Ok(script.frame(*frame))
    }
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        self.counters
            .navigations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        let script = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })?;

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        if script.times_out {
            return Err(ScrapeError::Timeout {
                url: url.to_string(),
            });
        }
        if let Some(message) = script.failure {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                message,
            });
        }

        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some((url.to_string(), 0));
        Ok(())
    }

    async fn content(&self) -> Result<String, ScrapeError> {
        self.current_document()
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        let selector = Selector::parse(selector)
            .map_err(|e| ScrapeError::Browser(format!("bad selector {}: {:?}", selector, e)))?;
        let document = Html::parse_document(&self.current_document()?);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }

    async fn scroll_to_end(&self) -> Result<(), ScrapeError> {
        self.counters.scrolls.fetch_add(1, Ordering::SeqCst);
        if let Some((_, frame)) = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_mut()
        {
            *frame += 1;
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Option<Vec<u8>>, ScrapeError> {
        Ok(Some(b"\x89PNG\r\n\x1a\n".to_vec()))
    }

    async fn close(&self) -> Result<(), ScrapeError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.counters.open.fetch_sub(1, Ordering::SeqCst);
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
