//! Scripted in-memory browser session for workflow tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ekw_fetch::error::SessionError;
use ekw_fetch::{BrowserSession, CaptureKind, Config, Locator, SessionFactory};
use ekw_fetch::workflow::{NOT_FOUND_MARKER, REJECTION_MARKER};

/// How the fake site behaves
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Number of navigations answered with the rejection page
    pub blocked_navigations: u32,
    pub not_found: bool,
    /// Selectors that never appear
    pub missing: HashSet<String>,
    /// Text returned for a selector
    pub texts: HashMap<String, String>,
}

impl Script {
    pub fn found() -> Self {
        let mut texts = HashMap::new();
        texts.insert(Locator::BookNumber.css(), " KR1P/00286974/1 ".to_string());
        texts.insert(Locator::BookType.css(), "NIERUCHOMOŚĆ GRUNTOWA".to_string());
        texts.insert(
            Locator::Location.css(),
            "MAŁOPOLSKIE, KRAKÓW, KRAKÓW".to_string(),
        );
        texts.insert(Locator::Owner.css(), "JAN KOWALSKI\nANNA KOWALSKA".to_string());
        Self {
            texts,
            ..Default::default()
        }
    }

    pub fn not_found() -> Self {
        Self {
            not_found: true,
            ..Default::default()
        }
    }

    pub fn blocked(navigations: u32) -> Self {
        Self {
            blocked_navigations: navigations,
            ..Self::found()
        }
    }

    pub fn without(mut self, locator: Locator) -> Self {
        self.missing.insert(locator.css());
        self
    }
}

/// Shared counters of a factory and its sessions
#[derive(Debug, Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
}

pub struct ScriptedSession {
    script: Script,
    navigations: Mutex<u32>,
    log: Arc<Mutex<Vec<String>>>,
    counters: Arc<Counters>,
}

impl ScriptedSession {
    pub fn new(script: Script) -> Self {
        Self::with_counters(script, Arc::new(Counters::default()))
    }

    fn with_counters(script: Script, counters: Arc<Counters>) -> Self {
        Self {
            script,
            navigations: Mutex::new(0),
            log: Arc::new(Mutex::new(Vec::new())),
            counters,
        }
    }

    /// Every call made, in order
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> u32 {
        *self.navigations.lock().unwrap()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    type Element = String;

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        tokio::time::sleep(Duration::from_millis(2)).await;
        *self.navigations.lock().unwrap() += 1;
        self.record(format!("navigate:{}", url));
        Ok(())
    }

    async fn page_source(&self) -> Result<String, SessionError> {
        if self.navigations() <= self.script.blocked_navigations {
            Ok(format!("<html><body>{}</body></html>", REJECTION_MARKER))
        } else {
            Ok("<html><body>eKW</body></html>".to_string())
        }
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<String, SessionError> {
        self.record(format!("find:{}", selector));
        if self.script.missing.contains(selector) {
            return Err(SessionError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            });
        }
        Ok(selector.to_string())
    }

    async fn type_into(&self, element: &String, text: &str) -> Result<(), SessionError> {
        self.record(format!("type:{}={}", element, text));
        Ok(())
    }

    async fn click(&self, element: &String) -> Result<(), SessionError> {
        self.record(format!("click:{}", element));
        Ok(())
    }

    async fn read_text(&self, element: &String) -> Result<String, SessionError> {
        if *element == Locator::ResultSection.css() {
            return Ok(if self.script.not_found {
                format!("Księga o numerze KR1P/00000001/0 {}.", NOT_FOUND_MARKER)
            } else {
                "Wyniki wyszukiwania".to_string()
            });
        }
        Ok(self.script.texts.get(element).cloned().unwrap_or_default())
    }

    async fn render_page(&self, kind: CaptureKind) -> Result<Vec<u8>, SessionError> {
        self.record(format!("render:{:?}", kind));
        Ok(format!("{:?} capture", kind).into_bytes())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.record("close".to_string());
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out scripted sessions and counts them
pub struct ScriptedFactory {
    script: Script,
    fail_open: bool,
    pub counters: Arc<Counters>,
}

impl ScriptedFactory {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            fail_open: false,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new(Script::found())
        }
    }
}

#[async_trait]
impl SessionFactory for ScriptedFactory {
    type Session = ScriptedSession;

    async fn open(&self) -> Result<ScriptedSession, SessionError> {
        if self.fail_open {
            return Err(SessionError::Launch("chrome not installed".to_string()));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_active.fetch_max(active, Ordering::SeqCst);
        Ok(ScriptedSession::with_counters(
            self.script.clone(),
            self.counters.clone(),
        ))
    }
}

/// Config writing into `dir`, without cooldowns
pub fn test_config(dir: &Path) -> Config {
    Config {
        out_dir: dir.join("output"),
        csv_file: dir.join("output.csv"),
        log_file: dir.join("ekw.log"),
        save_pdf: true,
        save_png: false,
        save_txt: true,
        element_timeout_secs: 1,
        block_cooldown_secs: 0,
        max_block_retries: 2,
        ..Default::default()
    }
}

/// Number of files below `dir`, recursively
pub fn count_files(dir: &Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .map(|path| {
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
