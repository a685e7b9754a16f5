use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error};

use crate::browser::session::SessionFactory;
use crate::config::Config;
use crate::error::SessionError;
use crate::infrastructure::PageDriver;

/// Launches one Chrome per session
///
/// Every session gets its own profile directory so concurrent browsers never
/// share cookies or lock files.
pub struct ChromeLauncher {
    headless: bool,
    executable: Option<PathBuf>,
    element_poll: Duration,
    launched: AtomicUsize,
}

impl ChromeLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            headless: config.headless,
            executable: config.chrome_executable.clone(),
            element_poll: Duration::from_millis(250),
            launched: AtomicUsize::new(0),
        }
    }

    fn next_profile_dir(&self) -> PathBuf {
        let seq = self.launched.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("ekw-chrome-{}-{}", std::process::id(), seq))
    }
}

#[async_trait]
impl SessionFactory for ChromeLauncher {
    type Session = PageDriver;

    async fn open(&self) -> Result<PageDriver, SessionError> {
        let profile_dir = self.next_profile_dir();
        let (browser, handler) =
            launch_browser(self.headless, self.executable.as_ref(), &profile_dir).await?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                error!("Failed to open a page: {}", e);
                handler.abort();
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(e.into());
            }
        };

        Ok(PageDriver::new(
            browser,
            page,
            handler,
            profile_dir,
            self.element_poll,
        ))
    }
}

/// Starts Chrome and spawns its event handler
async fn launch_browser(
    headless: bool,
    executable: Option<&PathBuf>,
    profile_dir: &Path,
) -> Result<(Browser, JoinHandle<()>), SessionError> {
    debug!("Launching Chrome with profile {}", profile_dir.display());

    let mut builder = BrowserConfig::builder()
        .window_size(1920, 1080)
        .user_data_dir(profile_dir)
        .args(vec!["--disable-gpu", "--no-sandbox", "--disable-dev-shm-usage"]);
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = executable {
        builder = builder.chrome_executable(path);
    }
    let config = builder.build().map_err(|e| {
        error!("Invalid Chrome configuration: {}", e);
        SessionError::Launch(e)
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("Failed to launch Chrome: {}", e);
        SessionError::Launch(e.to_string())
    })?;

    // Drive browser events in the background
    let handle = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // Let the browser state settle
    sleep(Duration::from_millis(300)).await;

    debug!("Chrome launched");
    Ok((browser, handle))
}
