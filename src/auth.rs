use std::{sync::Arc, time::Duration};

use reqwest::StatusCode;

use crate::error::ViewError;
use crate::notify::NotificationChannel;
use crate::page::Page;

/// Handles the universal 401/403 responses before endpoint-specific
/// error handling runs.
pub struct AuthErrorInterceptor {
    page: Page,
    notifier: Arc<dyn NotificationChannel>,
    login_route: String,
    redirect_delay: Duration,
}

impl AuthErrorInterceptor {
    pub fn new(
        page: Page,
        notifier: Arc<dyn NotificationChannel>,
        login_route: &str,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            page,
            notifier,
            login_route: login_route.to_string(),
            redirect_delay,
        }
    }

    /// Returns true when the response was consumed and the caller must stop.
    pub fn handle(&self, status: StatusCode) -> bool {
        self.intercept(status).is_some()
    }

    /// Like `handle`, but reports which auth failure was handled.
    pub fn intercept(&self, status: StatusCode) -> Option<ViewError> {
        match status {
            StatusCode::UNAUTHORIZED => {
                let err = ViewError::Unauthorized;
                self.notifier.error(&err.to_string());
                self.schedule_redirect();
                Some(err)
            }
            StatusCode::FORBIDDEN => {
                let err = ViewError::Forbidden;
                self.notifier.error(&err.to_string());
                Some(err)
            }
            _ => None,
        }
    }

    fn schedule_redirect(&self) {
        let page = self.page.clone();
        let route = self.login_route.clone();
        let delay = self.redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            page.navigate(&route);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastChannel;

    fn page() -> Page {
        Page::parse(
            r#"<div id="toast"><p id="toast-message"></p></div>"#,
            "/events/page/",
            "",
        )
    }

    #[tokio::test]
    async fn unauthorized_redirects_after_delay() {
        let page = page();
        let notifier = Arc::new(ToastChannel::new(page.clone(), Duration::from_secs(5)));
        let auth =
            AuthErrorInterceptor::new(page.clone(), notifier, "/users/login/", Duration::from_millis(20));

        assert!(auth.handle(StatusCode::UNAUTHORIZED));
        assert_eq!(page.location(), "/events/page/");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(page.location(), "/users/login/");
        assert!(page.toasts()[0].message.contains("session has expired"));
    }

    #[tokio::test]
    async fn forbidden_is_handled_without_redirect() {
        let page = page();
        let notifier = Arc::new(ToastChannel::new(page.clone(), Duration::from_secs(5)));
        let auth =
            AuthErrorInterceptor::new(page.clone(), notifier, "/users/login/", Duration::from_millis(1));

        assert!(auth.handle(StatusCode::FORBIDDEN));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(page.location(), "/events/page/");
        assert!(page.toasts()[0].message.starts_with("Access denied"));
    }

    #[tokio::test]
    async fn other_statuses_pass_through() {
        let page = page();
        let notifier = Arc::new(ToastChannel::new(page.clone(), Duration::from_secs(5)));
        let auth = AuthErrorInterceptor::new(page.clone(), notifier, "/users/login/", Duration::ZERO);

        assert!(!auth.handle(StatusCode::BAD_REQUEST));
        assert!(!auth.handle(StatusCode::OK));
        assert!(page.toasts().is_empty());
    }
}
