//! Authenticated request channel to the backtest web service.
//!
//! Every call goes through [`RequestChannel::send`], which attaches the CSRF
//! token to state-changing methods and keeps the busy overlay up for the
//! duration of the request.

pub mod busy;
pub mod cookies;

use reqwest::cookie::Jar;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ChannelConfig;
use crate::constants::channel::{
    CSRF_HEADER, MAX_ERROR_BODY_CHARS, REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE, SAFE_METHODS,
};
use crate::error::ChannelError;

pub use busy::{BusyGuard, BusyIndicator, BusyOverlay, OverlayFlag};
pub use cookies::{cookie_header, parse_cookie, seeded_jar};

/// Form body as ordered `(field, value)` pairs.
pub type FormFields<'a> = &'a [(&'a str, &'a str)];

/// Keep at most `MAX_ERROR_BODY_CHARS` characters of an error body.
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}… ({} bytes total)", &body[..cut], body.len()),
        None => body.to_string(),
    }
}

/// True for methods that do not change server state and skip CSRF protection.
pub fn is_csrf_safe(method: &Method) -> bool {
    SAFE_METHODS.contains(&method.as_str())
}

#[derive(Clone)]
pub struct RequestChannel {
    client: Client,
    base_url: Url,
    csrf_cookie: String,
    jar: Arc<Jar>,
    busy: Arc<BusyIndicator>,
}

impl RequestChannel {
    pub fn new(
        base_url: Url,
        config: &ChannelConfig,
        jar: Arc<Jar>,
        busy: Arc<BusyIndicator>,
    ) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(ChannelError::Transport)?;

        Ok(Self {
            client,
            base_url,
            csrf_cookie: config.csrf_cookie.clone(),
            jar,
            busy,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn busy(&self) -> &Arc<BusyIndicator> {
        &self.busy
    }

    /// Current CSRF token from the cookie jar, if any.
    pub fn csrf_token(&self) -> Option<String> {
        cookie_header(&self.jar, &self.base_url)
            .and_then(|header| parse_cookie(&header, &self.csrf_cookie))
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ChannelError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request and decode the JSON response body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        form: Option<FormFields<'_>>,
    ) -> Result<Value, ChannelError> {
        let body = self.send_raw(method, path, form).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn get(&self, path: &str) -> Result<Value, ChannelError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post_form(&self, path: &str, form: FormFields<'_>) -> Result<Value, ChannelError> {
        self.send(Method::POST, path, Some(form)).await
    }

    /// Load the application root so the service can hand out its CSRF cookie.
    pub async fn prime_session(&self) -> Result<(), ChannelError> {
        self.send_raw(Method::GET, "", None).await?;
        if self.csrf_token().is_some() {
            info!("🍪 [CHANNEL] CSRF cookie '{}' received", self.csrf_cookie);
        } else {
            warn!("⚠️ [CHANNEL] No '{}' cookie after priming session", self.csrf_cookie);
        }
        Ok(())
    }

    async fn send_raw(
        &self,
        method: Method,
        path: &str,
        form: Option<FormFields<'_>>,
    ) -> Result<String, ChannelError> {
        let url = self.endpoint(path)?;
        let _busy = self.busy.acquire();

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .header(ACCEPT, "application/json, text/javascript, */*; q=0.01");

        if !is_csrf_safe(&method) {
            match self.csrf_token() {
                Some(token) => request = request.header(CSRF_HEADER, token),
                None => warn!(
                    "⚠️ [CHANNEL] No '{}' cookie; sending {} {} without CSRF token",
                    self.csrf_cookie, method, url
                ),
            }
        }

        if let Some(fields) = form {
            request = request.form(fields);
        }

        debug!(method = %method, url = %url, "[CHANNEL] Sending request");
        let response = request
            .send()
            .await
            .map_err(|e| ChannelError::from_reqwest(e, url.as_str()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChannelError::from_reqwest(e, url.as_str()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, bytes = body.len(), "[CHANNEL] Request failed");
            return Err(ChannelError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        debug!(status = status.as_u16(), bytes = body.len(), "[CHANNEL] Response received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8000/pyalgotrade_web/").unwrap()
    }

    fn channel(cookies: &str) -> RequestChannel {
        RequestChannel::new(
            base(),
            &ChannelConfig::default(),
            seeded_jar(Some(cookies), &base()),
            BusyIndicator::new(Arc::new(OverlayFlag::default())),
        )
        .unwrap()
    }

    #[test]
    fn test_safe_methods() {
        assert!(is_csrf_safe(&Method::GET));
        assert!(is_csrf_safe(&Method::HEAD));
        assert!(is_csrf_safe(&Method::OPTIONS));
        assert!(is_csrf_safe(&Method::TRACE));
        assert!(!is_csrf_safe(&Method::POST));
        assert!(!is_csrf_safe(&Method::PUT));
        assert!(!is_csrf_safe(&Method::DELETE));
        assert!(!is_csrf_safe(&Method::PATCH));
    }

    #[test]
    fn test_endpoint_joins_under_base() {
        let ch = channel("");
        assert_eq!(
            ch.endpoint("ajax/beginBacktest/").unwrap().as_str(),
            "http://localhost:8000/pyalgotrade_web/ajax/beginBacktest/"
        );
        assert_eq!(
            ch.endpoint("/ajax/loadChartDataCsv/").unwrap().as_str(),
            "http://localhost:8000/pyalgotrade_web/ajax/loadChartDataCsv/"
        );
        assert_eq!(ch.endpoint("").unwrap().as_str(), "http://localhost:8000/pyalgotrade_web/");
    }

    #[test]
    fn test_csrf_token_from_cookie_store() {
        assert_eq!(
            channel("sessionid=1; csrftoken=tok").csrf_token(),
            Some("tok".to_string())
        );
        assert_eq!(channel("sessionid=1").csrf_token(), None);
    }

    #[test]
    fn test_csrf_token_follows_jar_updates() {
        let jar = seeded_jar(Some("csrftoken=old"), &base());
        let ch = RequestChannel::new(
            base(),
            &ChannelConfig::default(),
            Arc::clone(&jar),
            BusyIndicator::new(Arc::new(OverlayFlag::default())),
        )
        .unwrap();

        jar.add_cookie_str("csrftoken=fresh; Path=/", &base());
        assert_eq!(ch.csrf_token(), Some("fresh".to_string()));

        jar.add_cookie_str("csrftoken=\"\"; Max-Age=0; Path=/", &base());
        assert_eq!(ch.csrf_token(), None);
    }

    #[test]
    fn test_short_error_body_kept() {
        assert_eq!(truncate_body("<h1>Server Error</h1>"), "<h1>Server Error</h1>");
        assert_eq!(truncate_body(""), "");
    }

    #[test]
    fn test_long_error_body_truncated() {
        let page = "é".repeat(MAX_ERROR_BODY_CHARS + 100);
        let cut = truncate_body(&page);

        assert!(cut.starts_with(&"é".repeat(MAX_ERROR_BODY_CHARS)));
        assert!(!cut.starts_with(&"é".repeat(MAX_ERROR_BODY_CHARS + 1)));
        assert!(cut.ends_with(&format!("({} bytes total)", page.len())));
    }
}
