use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use jobharvest_core::error::AppError;
use jobharvest_core::traits::Navigator;

use crate::http_navigator::DESKTOP_USER_AGENT;

/// Marker that a results page (or a listing page) has rendered its content.
const READY_MARKER: &str = r#"[data-automation="jobTitle"], [data-automation="jobAdDetails"]"#;
const READY_WAIT: Duration = Duration::from_secs(5);
const READY_POLL: Duration = Duration::from_millis(250);

/// Rendering navigator driving a Chromium tab over the DevTools Protocol.
///
/// A single Chromium process and a single tab are shared by every clone, so
/// [`Navigator::go_back`] restores whatever the tab showed before the last
/// navigation (scroll position and listing context included).
///
/// # Example
///
/// ```rust,no_run
/// use jobharvest_client::BrowserNavigator;
/// use jobharvest_core::traits::Navigator;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let nav = BrowserNavigator::launch(true).await?;
/// let html = nav.navigate("https://www.seek.com.au/general-practitioner-jobs").await?;
/// println!("{} bytes", html.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BrowserNavigator {
    _browser: Arc<Browser>,
    page: Page,
    timeout: Duration,
}

impl BrowserNavigator {
    /// Launches Chromium with a **45 s** navigation timeout.
    pub async fn launch(headless: bool) -> Result<Self, AppError> {
        Self::launch_with_timeout(headless, Duration::from_secs(45)).await
    }

    pub async fn launch_with_timeout(headless: bool, timeout: Duration) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();

        if let Some(bin) = find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }
        if headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        let config = builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg("--lang=en-AU")
            .arg(format!("--user-agent={DESKTOP_USER_AGENT}"))
            .window_size(1920, 1080)
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to open tab: {e}")))?;

        tracing::info!(headless, "Browser launched");

        Ok(Self {
            _browser: Arc::new(browser),
            page,
            timeout,
        })
    }

    /// Polls for [`READY_MARKER`] for up to [`READY_WAIT`]. Never fails: a
    /// page without listings simply yields no cards.
    async fn wait_until_ready(&self) {
        let deadline = tokio::time::Instant::now() + READY_WAIT;
        while tokio::time::Instant::now() < deadline {
            if self.page.find_element(READY_MARKER).await.is_ok() {
                return;
            }
            tokio::time::sleep(READY_POLL).await;
        }
        tracing::debug!("Content marker not found, continuing");
    }
}

impl Navigator for BrowserNavigator {
    async fn navigate(&self, url: &str) -> Result<String, AppError> {
        let timeout = self.timeout;

        let result = tokio::time::timeout(timeout, async {
            self.page
                .goto(url)
                .await
                .map_err(|e| cdp_error(e, &format!("Failed to navigate to {url}")))?;

            self.wait_until_ready().await;

            self.page
                .content()
                .await
                .map_err(|e| cdp_error(e, "Failed to read page content"))
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(AppError::Timeout(timeout.as_secs())),
        }
    }

    async fn go_back(&self) -> Result<(), AppError> {
        let result = tokio::time::timeout(self.timeout, async {
            self.page
                .evaluate("window.history.back()")
                .await
                .map_err(|e| cdp_error(e, "history.back failed"))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| cdp_error(e, "Navigation back did not finish"))?;
            Ok::<(), AppError>(())
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(AppError::Timeout(self.timeout.as_secs())),
        }
    }
}

/// Maps a CDP failure: a broken session is fatal, everything else is a
/// page-level navigation error.
fn cdp_error(e: CdpError, context: &str) -> AppError {
    match e {
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            AppError::BrowserError(format!("{context}: {e}"))
        }
        CdpError::Timeout => AppError::NetworkError(format!("{context}: {e}")),
        other => AppError::HttpError(format!("{context}: {other}")),
    }
}

/// Tries to locate the real Chrome/Chromium binary.
///
/// The snap wrapper at `/snap/bin/chromium` strips unknown CLI flags, so the
/// binary inside the snap is preferred. `CHROME_BIN` overrides everything.
/// Returns `None` to let `chromiumoxide` do its own lookup.
fn find_chrome_binary() -> Option<PathBuf> {
    let candidates: &[&str] = &[
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
        "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ];

    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    candidates.iter().map(PathBuf::from).find(|p| p.exists())
}
