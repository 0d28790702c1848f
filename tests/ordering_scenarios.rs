//! End-to-end ordering runs against the in-memory site

use chrono::NaiveDate;
use relishplus::abstractions::{
    Control, ExecutorCall, MockInteractionExecutor, StaticCredentialProvider,
};
use relishplus::menu::Money;
use relishplus::ordering::{
    BrowsingSession, OrderingOrchestrator, OrderingSettings, RunReport, SlotStatus,
};
use relishplus::policy::DietaryProfile;
use relishplus::schedule::{MealSlot, MealType, ScheduleWindow, SiteUrls};
use relishplus::testing::{fixtures, RecordingDisplay};
use std::sync::Arc;

fn day(offset: u64) -> NaiveDate {
    fixtures::monday() + chrono::Days::new(offset)
}

fn with_menus(mock: MockInteractionExecutor) -> MockInteractionExecutor {
    mock.with_default_menu(MealType::Lunch, fixtures::reference_menu())
        .with_default_menu(MealType::Dinner, fixtures::reference_menu())
}

async fn run(
    mock: &MockInteractionExecutor,
    days: u32,
    profile: DietaryProfile,
) -> (RunReport, RecordingDisplay) {
    let display = RecordingDisplay::new();
    let mut settings = OrderingSettings::new(ScheduleWindow::new(fixtures::monday(), days).unwrap());
    settings.profile = profile;
    let orchestrator = OrderingOrchestrator::new(settings, Arc::new(display.clone()));
    let report = orchestrator
        .run(
            BrowsingSession::new(mock.clone()),
            &StaticCredentialProvider::new("me@example.com", "pw"),
            std::future::pending(),
        )
        .await
        .expect("run should not abort");
    (report, display)
}

#[tokio::test]
async fn test_six_day_window_orders_twelve_meals() {
    let mock = with_menus(MockInteractionExecutor::new());
    let (report, _) = run(&mock, 6, DietaryProfile::unrestricted()).await;

    assert_eq!(report.outcomes().len(), 12);
    assert_eq!(report.count(SlotStatus::Completed), 12);
    assert!(report.success());
    assert_eq!(mock.click_count(&Control::CompleteOrder), 12);
    assert_eq!(mock.click_count(&Control::LoginSubmit), 1);
    assert!(mock.is_closed());

    let slots: Vec<MealSlot> = report.outcomes().iter().map(|o| o.slot).collect();
    assert_eq!(slots[0], MealSlot::new(day(0), MealType::Lunch));
    assert_eq!(slots[1], MealSlot::new(day(0), MealType::Dinner));
    assert_eq!(slots[11], MealSlot::new(day(5), MealType::Dinner));
}

#[tokio::test]
async fn test_reference_menu_orders_bowl_vegetables_and_salad() {
    let mock = with_menus(MockInteractionExecutor::new());
    let (report, _) = run(&mock, 1, DietaryProfile::unrestricted()).await;

    let lunch = &report.outcomes()[0];
    assert_eq!(
        lunch.items,
        vec!["Grilled Chicken Bowl", "Roasted Vegetables", "Garden Salad"]
    );
    assert_eq!(lunch.subtotal, Money::new(16, 0));
    assert!(!mock.added_items().contains(&"D".to_string()));
}

#[tokio::test]
async fn test_skipped_slots_never_reach_checkout() {
    let mock = with_menus(
        MockInteractionExecutor::new()
            .with_unavailable_date(day(0))
            .with_existing_order(day(1), MealType::Lunch)
            .with_existing_order(day(1), MealType::Dinner),
    );
    let (report, display) = run(&mock, 3, DietaryProfile::unrestricted()).await;

    assert_eq!(report.count(SlotStatus::Unavailable), 2);
    assert_eq!(report.count(SlotStatus::AlreadyOrdered), 2);
    assert_eq!(report.count(SlotStatus::Completed), 2);
    assert!(report.success());
    assert_eq!(mock.click_count(&Control::ProceedToCheckout), 2);

    // Dinner on an unavailable date is skipped without another visit
    let monday_url = SiteUrls::default().date_url(day(0));
    let monday_visits = mock
        .calls()
        .iter()
        .filter(|call| **call == ExecutorCall::Navigate(monday_url.clone()))
        .count();
    assert_eq!(monday_visits, 1);

    assert_eq!(display.matching("already ordered").len(), 2);
    assert_eq!(display.matching("not available").len(), 1);
}

#[tokio::test]
async fn test_vegetarian_profile_never_adds_meat() {
    let mock = with_menus(MockInteractionExecutor::new());
    let (report, _) = run(&mock, 1, DietaryProfile::vegetarian()).await;

    assert!(!mock.added_items().contains(&"A".to_string()));
    let lunch = &report.outcomes()[0];
    assert_eq!(lunch.status, SlotStatus::Completed);
    assert_eq!(lunch.subtotal, Money::new(13, 0));
}

#[tokio::test]
async fn test_failed_slot_does_not_stop_the_run() {
    let mock = with_menus(MockInteractionExecutor::new())
        .with_menu(day(0), MealType::Dinner, fixtures::meat_only_menu());
    let (report, display) = run(&mock, 2, DietaryProfile::vegetarian()).await;

    let dinner = MealSlot::new(day(0), MealType::Dinner);
    assert_eq!(report.status_of(dinner), Some(SlotStatus::Failed));
    assert_eq!(report.count(SlotStatus::Completed), 3);
    assert!(!report.success());
    assert!(report.summary().contains("1 failed"));
    assert_eq!(display.matching("SPINNER_FAIL").len(), 1);
}

#[tokio::test]
async fn test_login_retry_then_full_run() {
    let mock = with_menus(MockInteractionExecutor::new().with_login_failures(1));
    let (report, _) = run(&mock, 1, DietaryProfile::unrestricted()).await;

    assert_eq!(mock.click_count(&Control::LoginSubmit), 2);
    assert!(report.success());
}
