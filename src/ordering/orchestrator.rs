//! Top-level run over the schedule window

use super::checkout::CheckoutOrchestrator;
use super::classifier::{MealStateClassifier, SlotStatus};
use super::report::{RunReport, SlotOutcome};
use super::session::{BrowsingSession, SessionController};
use crate::abstractions::{CredentialProvider, PageState};
use crate::error::{RelishError, Result};
use crate::interaction::ProgressDisplay;
use crate::policy::{BudgetPolicy, DietaryProfile, ItemSelectionPolicy};
use crate::schedule::{MealSlot, ScheduleWindow, SiteUrls};
use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Everything a run needs besides the session and credentials
#[derive(Debug, Clone)]
pub struct OrderingSettings {
    pub window: ScheduleWindow,
    pub urls: SiteUrls,
    pub profile: DietaryProfile,
    pub budget: BudgetPolicy,
    pub policy: ItemSelectionPolicy,
    pub classifier: MealStateClassifier,
    pub delivery_instructions: Option<String>,
}

impl OrderingSettings {
    /// Defaults for everything except the window
    pub fn new(window: ScheduleWindow) -> Self {
        Self {
            window,
            urls: SiteUrls::default(),
            profile: DietaryProfile::default(),
            budget: BudgetPolicy::default(),
            policy: ItemSelectionPolicy::default(),
            classifier: MealStateClassifier::default(),
            delivery_instructions: None,
        }
    }
}

/// Walks every slot in the window, skipping what needs no order and
/// checking out the rest.
///
/// Slot failures are recorded and the run moves on. Only fatal errors
/// (credentials, login, cancellation) abort it.
pub struct OrderingOrchestrator {
    settings: OrderingSettings,
    display: Arc<dyn ProgressDisplay>,
}

impl OrderingOrchestrator {
    pub fn new(settings: OrderingSettings, display: Arc<dyn ProgressDisplay>) -> Self {
        Self { settings, display }
    }

    pub fn settings(&self) -> &OrderingSettings {
        &self.settings
    }

    /// Run the whole window.
    ///
    /// `cancel` resolving stops the run at the next await point. The
    /// session is released on every exit path.
    pub async fn run<C>(
        &self,
        mut session: BrowsingSession,
        credentials: &dyn CredentialProvider,
        cancel: C,
    ) -> Result<RunReport>
    where
        C: Future<Output = ()>,
    {
        let mut report = RunReport::new();
        let result = tokio::select! {
            biased;
            _ = cancel => {
                warn!("Cancellation requested, stopping run");
                Err(RelishError::cancelled())
            }
            result = self.drive(&mut session, credentials, &mut report) => result,
        };

        if let Err(e) = session.release().await {
            warn!("Failed to release browsing session: {}", e);
        }

        match result {
            Ok(()) => Ok(report),
            Err(e) => {
                if !report.outcomes().is_empty() {
                    info!("Partial results before abort:\n{}", report.summary());
                }
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        session: &mut BrowsingSession,
        credentials: &dyn CredentialProvider,
        report: &mut RunReport,
    ) -> Result<()> {
        let credentials = credentials.credentials()?;
        let controller = SessionController::new(self.settings.urls.clone(), credentials);
        controller.login(session).await?;

        let window = &self.settings.window;
        info!(
            "Ordering {} day(s) from {} ({} slots)",
            window.day_count(),
            window.start_date(),
            window.slots().len()
        );

        let mut unavailable_date: Option<NaiveDate> = None;
        for slot in window.slots() {
            if unavailable_date == Some(slot.date) {
                info!("Skipping {}: date unavailable", slot);
                report.record(SlotOutcome::new(slot, SlotStatus::Unavailable));
                continue;
            }
            let outcome = self.process_slot(session, &controller, slot).await?;
            if outcome.status == SlotStatus::Unavailable {
                unavailable_date = Some(slot.date);
            }
            report.record(outcome);
        }

        info!(
            "Run finished: {} ordered, {} failed",
            report.count(SlotStatus::Completed),
            report.failed().count()
        );
        Ok(())
    }

    /// Returns `Err` only for errors that must abort the run
    async fn process_slot(
        &self,
        session: &mut BrowsingSession,
        controller: &SessionController,
        slot: MealSlot,
    ) -> Result<SlotOutcome> {
        self.display.progress(&format!("Checking {slot}"));

        let page = match open_slot(session, controller, slot).await {
            Ok(page) => page,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("{}: could not load date page: {}", slot, e);
                self.display.error(&format!("{slot}: {}", e.user_message()));
                return Ok(SlotOutcome::new(slot, SlotStatus::Failed).with_note(e.user_message()));
            }
        };

        let status = self.settings.classifier.classify(&page, slot.meal);
        match status {
            SlotStatus::Unavailable => {
                info!("Skipping {}: no ordering available for this date", slot);
                self.display
                    .info(&format!("{} not available, skipping", slot.date.format("%A %m/%d")));
                return Ok(SlotOutcome::new(slot, status));
            }
            SlotStatus::AlreadyOrdered => {
                info!("Skipping {}: already ordered", slot);
                self.display.info(&format!("{slot} already ordered"));
                return Ok(SlotOutcome::new(slot, status));
            }
            _ => {}
        }

        info!("{}: {} -> {}", slot, status, SlotStatus::InProgress);
        let mut spinner = self.display.start_spinner(&format!("Ordering {slot}"));
        let settings = &self.settings;
        let checkout = CheckoutOrchestrator::new(
            controller,
            &settings.classifier,
            &settings.policy,
            &settings.profile,
            &settings.budget,
        )
        .with_delivery_instructions(settings.delivery_instructions.as_deref());
        let result = checkout.run(session, slot, page.menu(slot.meal)).await;

        let status = if result.is_success() {
            SlotStatus::Completed
        } else {
            SlotStatus::Failed
        };
        let mut outcome = SlotOutcome::new(slot, status);
        outcome.items = result
            .cart
            .item_names()
            .into_iter()
            .map(String::from)
            .collect();
        outcome.subtotal = result.cart.subtotal();

        match result.failure {
            None => {
                info!("{}: {} -> {}", slot, SlotStatus::InProgress, status);
                spinner.success(&format!(
                    "{slot}: {} ({})",
                    outcome.items.join(", "),
                    outcome.subtotal
                ));
            }
            Some(e) => {
                error!("{}: {}", slot, e.developer_message());
                spinner.fail(&e.user_message());
                outcome.note = Some(e.user_message());
            }
        }

        if let Err(e) = controller.return_to_date(session, slot.date).await {
            warn!("{}: could not return to date page: {}", slot, e);
        }
        Ok(outcome)
    }
}

/// Show the slot's date page, logging in again if the session expired
async fn open_slot(
    session: &mut BrowsingSession,
    controller: &SessionController,
    slot: MealSlot,
) -> Result<PageState> {
    controller.return_to_date(session, slot.date).await?;
    let page = session.observe().await?;
    if page.authenticated {
        return Ok(page);
    }

    warn!("Session expired at {}, logging in again", slot);
    controller.login(session).await?;
    controller.return_to_date(session, slot.date).await?;
    session.observe().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstractions::{Control, MockInteractionExecutor, StaticCredentialProvider};
    use crate::error::ErrorCode;
    use crate::schedule::MealType;
    use crate::testing::{fixtures, RecordingDisplay};
    use std::time::Duration;

    fn orchestrator(days: u32, display: &RecordingDisplay) -> OrderingOrchestrator {
        let window = ScheduleWindow::new(fixtures::monday(), days).unwrap();
        OrderingOrchestrator::new(OrderingSettings::new(window), Arc::new(display.clone()))
    }

    fn credentials() -> StaticCredentialProvider {
        StaticCredentialProvider::new("me@example.com", "pw")
    }

    fn menus(mock: MockInteractionExecutor) -> MockInteractionExecutor {
        mock.with_default_menu(MealType::Lunch, fixtures::reference_menu())
            .with_default_menu(MealType::Dinner, fixtures::reference_menu())
    }

    #[tokio::test]
    async fn test_one_day_orders_both_meals() {
        let display = RecordingDisplay::new();
        let mock = menus(MockInteractionExecutor::new());

        let report = orchestrator(1, &display)
            .run(
                BrowsingSession::new(mock.clone()),
                &credentials(),
                std::future::pending(),
            )
            .await
            .unwrap();

        assert!(report.success());
        assert_eq!(report.count(SlotStatus::Completed), 2);
        assert!(mock.is_ordered(fixtures::monday(), MealType::Lunch));
        assert!(mock.is_ordered(fixtures::monday(), MealType::Dinner));
        assert!(mock.is_closed());
        assert_eq!(display.matching("SPINNER_SUCCESS").len(), 2);
    }

    #[tokio::test]
    async fn test_missing_credentials_abort_before_navigation() {
        let display = RecordingDisplay::new();
        let mock = MockInteractionExecutor::new();

        let err = orchestrator(1, &display)
            .run(
                BrowsingSession::new(mock.clone()),
                &StaticCredentialProvider::missing(),
                std::future::pending(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::CREDENTIALS_MISSING);
        assert_eq!(mock.calls(), vec![crate::abstractions::ExecutorCall::Close]);
    }

    #[tokio::test]
    async fn test_fatal_login_failure_releases_session() {
        let display = RecordingDisplay::new();
        let mock = menus(MockInteractionExecutor::new().with_login_failures(2));

        let err = orchestrator(2, &display)
            .run(
                BrowsingSession::new(mock.clone()),
                &credentials(),
                std::future::pending(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::SESSION_LOGIN_FAILED);
        assert!(mock.is_closed());
        assert_eq!(mock.click_count(&Control::ProceedToCheckout), 0);
    }

    #[tokio::test]
    async fn test_expired_session_logs_in_again() {
        let display = RecordingDisplay::new();
        // Navigations: login page, Monday for lunch, Monday for dinner
        let mock = menus(
            MockInteractionExecutor::new()
                .with_existing_order(fixtures::monday(), MealType::Lunch)
                .with_session_expiry_at_navigation(3),
        );

        let report = orchestrator(1, &display)
            .run(
                BrowsingSession::new(mock.clone()),
                &credentials(),
                std::future::pending(),
            )
            .await
            .unwrap();

        assert_eq!(mock.click_count(&Control::LoginSubmit), 2);
        let dinner = MealSlot::new(fixtures::monday(), MealType::Dinner);
        assert_eq!(report.status_of(dinner), Some(SlotStatus::Completed));
    }

    #[tokio::test]
    async fn test_cancellation_stops_run_and_releases_session() {
        let display = RecordingDisplay::new();
        let mock = menus(MockInteractionExecutor::new())
            .with_navigation_delay(Duration::from_millis(200));

        let err = orchestrator(6, &display)
            .run(
                BrowsingSession::new(mock.clone()),
                &credentials(),
                tokio::time::sleep(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::SESSION_CANCELLED);
        assert_eq!(err.exit_code(), 130);
        assert!(mock.is_closed());
        assert_eq!(mock.click_count(&Control::CompleteOrder), 0);
    }
}
