//! Browsing session ownership and login/navigation control

use crate::abstractions::{ClickOutcome, Control, Credentials, Field, InteractionExecutor, PageState};
use crate::error::{ErrorCode, RelishError, Result};
use crate::schedule::SiteUrls;
use chrono::NaiveDate;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Extra login submissions after the first rejection. The site is known to
/// report bogus credential errors now and then.
pub const LOGIN_RETRIES: u32 = 1;

/// The single browsing context, owned by whoever is driving it.
///
/// Passed down the call chain as `&mut`, so no two requests can overlap.
/// Call [`BrowsingSession::release`] when done; dropping an unreleased
/// session only logs a warning since closing is asynchronous.
pub struct BrowsingSession {
    executor: Box<dyn InteractionExecutor>,
    action_timeout: Option<Duration>,
    released: bool,
}

impl BrowsingSession {
    pub fn new(executor: impl InteractionExecutor + 'static) -> Self {
        Self::from_boxed(Box::new(executor))
    }

    pub fn from_boxed(executor: Box<dyn InteractionExecutor>) -> Self {
        Self {
            executor,
            action_timeout: None,
            released: false,
        }
    }

    /// Bound every executor call; a call that overruns is an executor error
    pub fn with_action_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        bounded(self.action_timeout, "navigate", self.executor.navigate(url)).await
    }

    pub async fn observe(&mut self) -> Result<PageState> {
        bounded(
            self.action_timeout,
            "observe page",
            self.executor.observe_page_state(),
        )
        .await
    }

    pub async fn click(&mut self, control: &Control) -> Result<ClickOutcome> {
        debug!("Clicking {}", control);
        let action = control.to_string();
        bounded(
            self.action_timeout,
            &action,
            self.executor.click_control(control),
        )
        .await
    }

    pub async fn type_text(&mut self, field: Field, value: &str) -> Result<()> {
        bounded(
            self.action_timeout,
            "type text",
            self.executor.type_text(field, value),
        )
        .await
    }

    /// Close the browsing context. Consumes the session.
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        debug!("Releasing browsing session");
        self.executor.close().await
    }
}

impl Drop for BrowsingSession {
    fn drop(&mut self) {
        if !self.released {
            warn!("Browsing session dropped without being released");
        }
    }
}

async fn bounded<T>(
    limit: Option<Duration>,
    action: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        None => call.await,
        Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
            RelishError::executor_with_code(
                ErrorCode::EXEC_TIMEOUT,
                format!("no response within {limit:?}"),
                Some(action.to_string()),
            )
        })?,
    }
}

/// Handles login and keeps the session pointed at the right date page
pub struct SessionController {
    urls: SiteUrls,
    credentials: Credentials,
}

impl SessionController {
    pub fn new(urls: SiteUrls, credentials: Credentials) -> Self {
        Self { urls, credentials }
    }

    pub fn date_url(&self, date: NaiveDate) -> String {
        self.urls.date_url(date)
    }

    /// Log in, re-submitting once if the site rejects the first attempt.
    ///
    /// A second rejection is fatal for the run.
    pub async fn login(&self, session: &mut BrowsingSession) -> Result<()> {
        info!("Logging in as {}", self.credentials.identity);
        session.navigate(self.urls.login_url()).await?;
        session
            .type_text(Field::Email, &self.credentials.identity)
            .await?;
        session
            .type_text(Field::Password, &self.credentials.secret)
            .await?;

        let mut last_error = String::new();
        for attempt in 0..=LOGIN_RETRIES {
            if attempt > 0 {
                warn!(
                    "Login rejected ({}), submitting again ({})",
                    last_error,
                    attempt_label(attempt)
                );
            }
            match submit_login(session).await {
                Ok(page) if page.authenticated => {
                    dismiss_welcome(session, &page).await;
                    info!("Logged in");
                    return Ok(());
                }
                Ok(page) => {
                    last_error = page
                        .login_error
                        .unwrap_or_else(|| "login not accepted".to_string());
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        Err(RelishError::session_with_code(
            ErrorCode::SESSION_LOGIN_FAILED,
            format!(
                "login failed after {} attempts: {}",
                LOGIN_RETRIES + 1,
                last_error
            ),
        ))
    }

    /// Point the session back at the schedule page for `date`
    pub async fn return_to_date(&self, session: &mut BrowsingSession, date: NaiveDate) -> Result<()> {
        session.navigate(&self.urls.date_url(date)).await
    }
}

/// One-based position of a login submission among all allowed submissions
fn attempt_label(attempt: u32) -> String {
    format!("attempt {}/{}", attempt + 1, LOGIN_RETRIES + 1)
}

async fn submit_login(session: &mut BrowsingSession) -> Result<PageState> {
    if session.click(&Control::LoginSubmit).await? == ClickOutcome::NotFound {
        return Err(RelishError::session_with_code(
            ErrorCode::SESSION_LOGIN_CONTROL_MISSING,
            "login submit button not found",
        ));
    }
    session.observe().await
}

async fn dismiss_welcome(session: &mut BrowsingSession, page: &PageState) {
    if !page.welcome_prompt {
        return;
    }
    match session.click(&Control::WelcomeContinue).await {
        Ok(ClickOutcome::Clicked) => debug!("Dismissed welcome screen"),
        Ok(ClickOutcome::NotFound) => debug!("Welcome screen had no continue button"),
        Err(e) => warn!("Could not dismiss welcome screen: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstractions::{ExecutorCall, MockInteractionExecutor};

    fn controller() -> SessionController {
        SessionController::new(
            SiteUrls::default(),
            Credentials::new("me@example.com", "secret"),
        )
    }

    #[tokio::test]
    async fn test_login_succeeds_first_time_and_dismisses_welcome() {
        let mock = MockInteractionExecutor::new();
        let mut session = BrowsingSession::new(mock.clone());

        controller().login(&mut session).await.unwrap();
        session.release().await.unwrap();

        assert_eq!(mock.click_count(&Control::LoginSubmit), 1);
        assert_eq!(mock.click_count(&Control::WelcomeContinue), 1);
        assert!(mock.calls().contains(&ExecutorCall::Type(
            Field::Email,
            "me@example.com".to_string()
        )));
        assert!(mock.is_closed());
    }

    #[tokio::test]
    async fn test_login_retries_once() {
        let mock = MockInteractionExecutor::new().with_login_failures(1);
        let mut session = BrowsingSession::new(mock.clone());

        controller().login(&mut session).await.unwrap();
        session.release().await.unwrap();
        assert_eq!(mock.click_count(&Control::LoginSubmit), 2);
    }

    #[tokio::test]
    async fn test_second_login_failure_is_fatal() {
        let mock = MockInteractionExecutor::new().with_login_failures(2);
        let mut session = BrowsingSession::new(mock.clone());

        let err = controller().login(&mut session).await.unwrap_err();
        session.release().await.unwrap();

        assert_eq!(err.code(), ErrorCode::SESSION_LOGIN_FAILED);
        assert!(err.is_fatal());
        assert!(err.to_string().contains("Incorrect email or password"));
        assert_eq!(mock.click_count(&Control::LoginSubmit), 2);
    }

    #[test]
    fn test_attempt_label_counts_all_submissions() {
        assert_eq!(attempt_label(0), "attempt 1/2");
        assert_eq!(attempt_label(LOGIN_RETRIES), "attempt 2/2");
    }

    #[tokio::test]
    async fn test_action_timeout() {
        let mock = MockInteractionExecutor::new().with_navigation_delay(Duration::from_secs(5));
        let mut session =
            BrowsingSession::new(mock).with_action_timeout(Some(Duration::from_millis(10)));

        let err = session.navigate("https://example.com").await.unwrap_err();
        session.release().await.unwrap();
        assert_eq!(err.code(), ErrorCode::EXEC_TIMEOUT);
    }

    #[tokio::test]
    async fn test_return_to_date_uses_iso_url() {
        let mock = MockInteractionExecutor::new();
        let mut session = BrowsingSession::new(mock.clone());
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

        controller()
            .return_to_date(&mut session, date)
            .await
            .unwrap();
        session.release().await.unwrap();

        assert_eq!(
            mock.calls()[0],
            ExecutorCall::Navigate("https://relish.ezcater.com/schedule/2024-02-29".into())
        );
    }
}
