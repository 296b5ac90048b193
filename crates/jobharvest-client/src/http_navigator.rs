use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobharvest_core::error::AppError;
use jobharvest_core::traits::Navigator;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

pub(crate) const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Non-rendering navigator using reqwest.
///
/// Downloads raw HTML with a desktop User-Agent and an `en-AU` locale.
/// There is no rendered page to restore, so [`Navigator::go_back`] only
/// moves the context back to the last page that loaded before the current
/// navigation; it never issues a request.
///
/// Pages that build their listings client-side come back empty here; use
/// the `BrowserNavigator` (feature `browser`) for those.
#[derive(Clone)]
pub struct HttpNavigator {
    client: Client,
    timeout_secs: u64,
    context: Arc<Mutex<NavContext>>,
}

/// The page currently shown and the one `go_back` returns to.
#[derive(Debug, Default)]
struct NavContext {
    /// `None` after a failed navigation (the "error page").
    current: Option<String>,
    previous: Option<String>,
}

impl HttpNavigator {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(45))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-AU,en;q=0.9"));

        let client = Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
            context: Arc::new(Mutex::new(NavContext::default())),
        })
    }

    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }

    /// URL of the page the navigator is on, if the last navigation succeeded.
    pub fn current_url(&self) -> Option<String> {
        self.context().current.clone()
    }

    fn context(&self) -> std::sync::MutexGuard<'_, NavContext> {
        self.context.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for HttpNavigator {
    async fn navigate(&self, url: &str) -> Result<String, AppError> {
        let result = self.fetch(url).await;

        let mut context = self.context();
        if let Some(current) = context.current.take() {
            context.previous = Some(current);
        }
        context.current = result.is_ok().then(|| url.to_string());
        result
    }

    async fn go_back(&self) -> Result<(), AppError> {
        let mut context = self.context();
        match context.previous.take() {
            Some(previous) => {
                context.current = Some(previous);
                Ok(())
            }
            None => Err(AppError::HttpError("No previous page to go back to".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves HTML on every path except ones containing `missing`, which get
    /// a 404. Returns the base URL and the log of requested paths.
    async fn serve() -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = [0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                log.lock().unwrap().push(path.clone());

                let (status, body) = if path.contains("missing") {
                    ("404 Not Found", String::new())
                } else {
                    ("200 OK", format!("<html><body>{path}</body></html>"))
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (format!("http://{addr}"), requests)
    }

    #[tokio::test]
    async fn test_navigate_returns_body() {
        let (base, _) = serve().await;
        let nav = HttpNavigator::new().unwrap();

        let html = nav.navigate(&format!("{base}/gp-jobs")).await.unwrap();
        assert!(html.contains("/gp-jobs"));
        assert_eq!(nav.current_url(), Some(format!("{base}/gp-jobs")));
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let (base, _) = serve().await;
        let nav = HttpNavigator::new().unwrap();

        let err = nav.navigate(&format!("{base}/missing")).await.unwrap_err();
        assert!(matches!(err, AppError::HttpError(ref m) if m.contains("404")));
        assert!(err.is_navigation_error());
        assert_eq!(nav.current_url(), None);
    }

    #[tokio::test]
    async fn test_go_back_returns_to_results_without_refetching() {
        let (base, requests) = serve().await;
        let nav = HttpNavigator::new().unwrap();

        nav.navigate(&format!("{base}/results?page=1")).await.unwrap();
        nav.navigate(&format!("{base}/job/1")).await.unwrap();
        nav.go_back().await.unwrap();

        assert_eq!(nav.current_url(), Some(format!("{base}/results?page=1")));
        assert_eq!(*requests.lock().unwrap(), vec!["/results?page=1", "/job/1"]);
    }

    #[tokio::test]
    async fn test_failed_detail_keeps_results_page_as_context() {
        let (base, requests) = serve().await;
        let nav = HttpNavigator::new().unwrap();

        nav.navigate(&format!("{base}/results?page=1")).await.unwrap();
        nav.navigate(&format!("{base}/results?page=2")).await.unwrap();
        assert!(nav.navigate(&format!("{base}/job/missing")).await.is_err());
        nav.go_back().await.unwrap();

        assert_eq!(nav.current_url(), Some(format!("{base}/results?page=2")));
        assert_eq!(
            *requests.lock().unwrap(),
            vec!["/results?page=1", "/results?page=2", "/job/missing"]
        );
    }

    #[tokio::test]
    async fn test_consecutive_failures_keep_last_good_page() {
        let (base, _) = serve().await;
        let nav = HttpNavigator::new().unwrap();

        nav.navigate(&format!("{base}/results?page=2")).await.unwrap();
        assert!(nav.navigate(&format!("{base}/job/missing-1")).await.is_err());
        assert!(nav.navigate(&format!("{base}/job/missing-2")).await.is_err());
        nav.go_back().await.unwrap();

        assert_eq!(nav.current_url(), Some(format!("{base}/results?page=2")));
    }

    #[tokio::test]
    async fn test_go_back_only_steps_back_once() {
        let (base, _) = serve().await;
        let nav = HttpNavigator::new().unwrap();

        nav.navigate(&format!("{base}/results")).await.unwrap();
        nav.navigate(&format!("{base}/job/1")).await.unwrap();
        nav.go_back().await.unwrap();

        assert!(nav.go_back().await.is_err());
    }

    #[tokio::test]
    async fn test_go_back_without_history_fails() {
        let nav = HttpNavigator::new().unwrap();
        assert!(nav.go_back().await.is_err());
    }
}
