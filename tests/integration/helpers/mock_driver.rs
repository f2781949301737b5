// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rankrs::engines::traits::{DriverError, DriverFactory, Locator, SearchDriver};

/// One scripted results page.
pub struct MockPage {
    pub url: String,
    pub html: String,
}

struct MockState {
    pages: Vec<MockPage>,
    index: usize,
    nav_faults: VecDeque<DriverError>,
    navigations: usize,
    clicks: Vec<String>,
    screenshots: usize,
    closed: bool,
    interrupt_on_navigate: Option<Arc<std::sync::atomic::AtomicBool>>,
}

/// Scripted driver: a fixed sequence of pages, advanced by clicking a
/// next-page control. Selector matching runs against the real HTML so the
/// locator lists are exercised for real.
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new(pages: Vec<MockPage>) -> Arc<Self> {
        Self::with_nav_faults(pages, Vec::new())
    }

    pub fn with_nav_faults(pages: Vec<MockPage>, faults: Vec<DriverError>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState {
                pages,
                index: 0,
                nav_faults: faults.into(),
                navigations: 0,
                clicks: Vec::new(),
                screenshots: 0,
                closed: false,
                interrupt_on_navigate: None,
            }),
        })
    }

    /// Makes every successful navigation raise the given interrupt flag, so
    /// cancellation mid-batch can be exercised deterministically.
    pub fn interrupt_on_navigate(&self, flag: Arc<std::sync::atomic::AtomicBool>) {
        self.state.lock().unwrap().interrupt_on_navigate = Some(flag);
    }

    pub fn navigations(&self) -> usize {
        self.state.lock().unwrap().navigations
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn screenshot_count(&self) -> usize {
        self.state.lock().unwrap().screenshots
    }

    pub fn closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn matches(html: &str, locator: &Locator) -> bool {
        let document = Html::parse_document(html);
        match locator {
            Locator::Css(selector) => match Selector::parse(selector) {
                Ok(parsed) => document.select(&parsed).next().is_some(),
                Err(_) => false,
            },
            Locator::Text { tag, needle } => match Selector::parse(tag) {
                Ok(parsed) => document
                    .select(&parsed)
                    .any(|e| e.text().collect::<String>().contains(needle)),
                Err(_) => false,
            },
        }
    }

    fn is_next_control(locator: &Locator) -> bool {
        match locator {
            Locator::Css(selector) => {
                selector.contains("pnnext") || selector.contains("aria-label='Next")
                    || selector.contains("aria-label='Page suivante'")
            }
            Locator::Text { needle, .. } => *needle == "Next" || *needle == "下一页",
        }
    }
}

#[async_trait]
impl SearchDriver for MockDriver {
    async fn navigate(&self, _url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if let Some(fault) = state.nav_faults.pop_front() {
            return Err(fault);
        }
        state.navigations += 1;
        state.index = 0;
        if let Some(flag) = &state.interrupt_on_navigate {
            flag.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .pages
            .get(state.index)
            .map(|p| p.url.clone())
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn content(&self) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .pages
            .get(state.index)
            .map(|p| p.html.clone())
            .unwrap_or_default())
    }

    async fn wait_for(&self, locator: &Locator, _timeout: Duration) -> Result<bool, DriverError> {
        let state = self.state.lock().unwrap();
        let html = state
            .pages
            .get(state.index)
            .map(|p| p.html.as_str())
            .unwrap_or("");
        Ok(Self::matches(html, locator))
    }

    async fn click(&self, locator: &Locator) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let html = state
            .pages
            .get(state.index)
            .map(|p| p.html.clone())
            .unwrap_or_default();

        if !Self::matches(&html, locator) {
            return Err(DriverError::NotFound(locator.to_string()));
        }

        state.clicks.push(locator.to_string());
        if Self::is_next_control(locator) && state.index + 1 < state.pages.len() {
            state.index += 1;
        }
        Ok(())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), DriverError> {
        let state = self.state.lock().unwrap();
        let html = state
            .pages
            .get(state.index)
            .map(|p| p.html.as_str())
            .unwrap_or("");
        if Self::matches(html, locator) {
            Ok(())
        } else {
            Err(DriverError::NotFound(locator.to_string()))
        }
    }

    async fn screenshot(&self, _path: &Path) -> Result<(), DriverError> {
        self.state.lock().unwrap().screenshots += 1;
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Factory handing out pre-built drivers in order; running out of scripted
/// drivers makes the next launch fail, which models a dead environment.
pub struct MockFactory {
    drivers: Mutex<VecDeque<Arc<MockDriver>>>,
    launches: AtomicUsize,
}

impl MockFactory {
    pub fn new(drivers: Vec<Arc<MockDriver>>) -> Arc<Self> {
        Arc::new(Self {
            drivers: Mutex::new(drivers.into()),
            launches: AtomicUsize::new(0),
        })
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriverFactory for MockFactory {
    async fn launch(&self) -> Result<Arc<dyn SearchDriver>, DriverError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let next = self.drivers.lock().unwrap().pop_front();
        match next {
            Some(driver) => Ok(driver as Arc<dyn SearchDriver>),
            None => Err(DriverError::InitFailed(
                "no scripted driver available".to_string(),
            )),
        }
    }
}
