//! Cart building and checkout for one meal slot
//!
//! Modeled as an explicit state machine:
//!
//! ```text
//! Selecting --item--> Adding --(clicked | skipped)--> Selecting
//! Selecting --stop, cart non-empty--> CheckingOut --> Verifying --> Done
//! Selecting --stop, cart empty--> Failed
//! CheckingOut / Verifying --error--> Failed
//! ```

use super::classifier::{MealStateClassifier, SlotStatus};
use super::session::{BrowsingSession, SessionController};
use crate::abstractions::{ClickOutcome, Control, Field};
use crate::error::{ErrorCode, RelishError, Result};
use crate::menu::{CartState, MenuItem};
use crate::policy::{BudgetPolicy, DietaryProfile, ItemSelectionPolicy, SelectionAction};
use crate::schedule::MealSlot;
use tracing::{debug, info, warn};

/// Checkout submissions per slot, counting the first
pub const CHECKOUT_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    Selecting,
    Adding(MenuItem),
    CheckingOut,
    Verifying,
    Done,
    Failed,
}

/// Result of one slot's checkout
#[derive(Debug)]
pub struct CheckoutOutcome {
    pub cart: CartState,
    /// Names of items whose add control could not be clicked
    pub skipped_items: Vec<String>,
    pub failure: Option<RelishError>,
}

impl CheckoutOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Drives selection, add-to-cart, checkout and verification for a slot
pub struct CheckoutOrchestrator<'a> {
    controller: &'a SessionController,
    classifier: &'a MealStateClassifier,
    policy: &'a ItemSelectionPolicy,
    profile: &'a DietaryProfile,
    budget: &'a BudgetPolicy,
    delivery_instructions: Option<&'a str>,
}

impl<'a> CheckoutOrchestrator<'a> {
    pub fn new(
        controller: &'a SessionController,
        classifier: &'a MealStateClassifier,
        policy: &'a ItemSelectionPolicy,
        profile: &'a DietaryProfile,
        budget: &'a BudgetPolicy,
    ) -> Self {
        Self {
            controller,
            classifier,
            policy,
            profile,
            budget,
            delivery_instructions: None,
        }
    }

    pub fn with_delivery_instructions(mut self, instructions: Option<&'a str>) -> Self {
        self.delivery_instructions = instructions.filter(|s| !s.trim().is_empty());
        self
    }

    /// Order `menu` items for `slot`. The session must already show the
    /// slot's date page.
    pub async fn run(
        &self,
        session: &mut BrowsingSession,
        slot: MealSlot,
        menu: Vec<MenuItem>,
    ) -> CheckoutOutcome {
        let mut candidates = menu;
        let mut cart = CartState::new();
        let mut skipped_items = Vec::new();
        let mut failure = None;
        let mut state = CheckoutState::Selecting;

        loop {
            state = match state {
                CheckoutState::Selecting => {
                    match self
                        .policy
                        .select_next(&candidates, &cart, self.profile, self.budget)
                    {
                        SelectionAction::AddItem(item) => CheckoutState::Adding(item),
                        SelectionAction::StopSelection if cart.is_empty() => {
                            failure = Some(RelishError::ordering_with_code(
                                ErrorCode::ORDER_EMPTY_CART,
                                format!(
                                    "no eligible items within budget ({})",
                                    self.profile.label()
                                ),
                                Some(slot.to_string()),
                            ));
                            CheckoutState::Failed
                        }
                        SelectionAction::StopSelection => {
                            info!(
                                "{}: cart complete with {} item(s), {}",
                                slot,
                                cart.len(),
                                cart.subtotal()
                            );
                            CheckoutState::CheckingOut
                        }
                    }
                }
                CheckoutState::Adding(item) => {
                    let control = Control::AddToCart {
                        meal: slot.meal,
                        item_id: item.id.clone(),
                        item_name: item.name.clone(),
                    };
                    match session.click(&control).await {
                        Ok(ClickOutcome::Clicked) => {
                            debug!("{}: added {} ({})", slot, item.name, item.pretax_price);
                            cart.add(item);
                        }
                        outcome => {
                            match outcome {
                                Err(e) => warn!("{}: adding {} failed: {}", slot, item.name, e),
                                _ => warn!("{}: no add button for {}, skipping", slot, item.name),
                            }
                            candidates.retain(|c| c.id != item.id);
                            skipped_items.push(item.name);
                        }
                    }
                    CheckoutState::Selecting
                }
                CheckoutState::CheckingOut => match self.submit_with_retry(session, slot).await {
                    Ok(()) => CheckoutState::Verifying,
                    Err(e) => {
                        failure = Some(e);
                        CheckoutState::Failed
                    }
                },
                CheckoutState::Verifying => match self.verify(session, slot).await {
                    Ok(()) => CheckoutState::Done,
                    Err(e) => {
                        failure = Some(e);
                        CheckoutState::Failed
                    }
                },
                CheckoutState::Done | CheckoutState::Failed => break,
            };
        }

        CheckoutOutcome {
            cart,
            skipped_items,
            failure,
        }
    }

    async fn submit_with_retry(&self, session: &mut BrowsingSession, slot: MealSlot) -> Result<()> {
        let mut last_error = None;
        for attempt in 1..=CHECKOUT_ATTEMPTS {
            match self.submit_order(session).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if attempt < CHECKOUT_ATTEMPTS {
                        warn!("{}: checkout attempt {} failed: {}, retrying", slot, attempt, e);
                    }
                    last_error = Some(e);
                }
            }
        }

        let error = RelishError::ordering_with_code(
            ErrorCode::ORDER_CHECKOUT_FAILED,
            format!("checkout failed after {CHECKOUT_ATTEMPTS} attempts"),
            Some(slot.to_string()),
        );
        Err(match last_error {
            Some(cause) => error.with_source(cause),
            None => error,
        })
    }

    async fn submit_order(&self, session: &mut BrowsingSession) -> Result<()> {
        click_required(session, &Control::ProceedToCheckout).await?;
        if let Some(instructions) = self.delivery_instructions {
            session
                .type_text(Field::DeliveryInstructions, instructions)
                .await?;
        }
        click_required(session, &Control::CompleteOrder).await
    }

    /// Reload the date page and require the slot to show as ordered
    async fn verify(&self, session: &mut BrowsingSession, slot: MealSlot) -> Result<()> {
        let not_verified = |message: String| {
            RelishError::ordering_with_code(
                ErrorCode::ORDER_VERIFICATION_FAILED,
                message,
                Some(slot.to_string()),
            )
        };

        self.controller
            .return_to_date(session, slot.date)
            .await
            .map_err(|e| not_verified("could not reload date page".into()).with_source(e))?;
        let page = session
            .observe()
            .await
            .map_err(|e| not_verified("could not read date page".into()).with_source(e))?;

        match self.classifier.classify(&page, slot.meal) {
            SlotStatus::AlreadyOrdered => {
                info!("{}: order confirmed", slot);
                Ok(())
            }
            status => Err(not_verified(format!(
                "order not shown after checkout (status: {status})"
            ))),
        }
    }
}

async fn click_required(session: &mut BrowsingSession, control: &Control) -> Result<()> {
    match session.click(control).await? {
        ClickOutcome::Clicked => Ok(()),
        ClickOutcome::NotFound => Err(RelishError::executor_with_code(
            ErrorCode::EXEC_ACTION_FAILED,
            "control not found",
            Some(control.to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstractions::{Credentials, ExecutorCall, MockInteractionExecutor};
    use crate::menu::Money;
    use crate::schedule::{MealType, SiteUrls};
    use crate::testing::fixtures;

    struct Harness {
        controller: SessionController,
        classifier: MealStateClassifier,
        policy: ItemSelectionPolicy,
        profile: DietaryProfile,
        budget: BudgetPolicy,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                controller: SessionController::new(
                    SiteUrls::default(),
                    Credentials::new("me@example.com", "pw"),
                ),
                classifier: MealStateClassifier::new(),
                policy: ItemSelectionPolicy::default(),
                profile: DietaryProfile::unrestricted(),
                budget: BudgetPolicy::default(),
            }
        }

        fn checkout(&self) -> CheckoutOrchestrator<'_> {
            CheckoutOrchestrator::new(
                &self.controller,
                &self.classifier,
                &self.policy,
                &self.profile,
                &self.budget,
            )
        }

        async fn run(&self, mock: &MockInteractionExecutor, menu: Vec<MenuItem>) -> CheckoutOutcome {
            let mut session = BrowsingSession::new(mock.clone());
            self.controller.login(&mut session).await.unwrap();
            self.controller
                .return_to_date(&mut session, slot().date)
                .await
                .unwrap();
            let outcome = self
                .checkout()
                .with_delivery_instructions(Some("Leave at front desk"))
                .run(&mut session, slot(), menu)
                .await;
            session.release().await.unwrap();
            outcome
        }
    }

    fn slot() -> MealSlot {
        MealSlot::new(fixtures::monday(), MealType::Lunch)
    }

    fn ids(cart: &CartState) -> Vec<&str> {
        cart.items().iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_happy_path_orders_and_verifies() {
        let mock = MockInteractionExecutor::new();
        let outcome = Harness::new().run(&mock, fixtures::reference_menu()).await;

        assert!(outcome.is_success(), "{:?}", outcome.failure);
        assert_eq!(ids(&outcome.cart), vec!["A", "B", "C"]);
        assert_eq!(outcome.cart.subtotal(), Money::new(16, 0));
        assert!(mock.is_ordered(slot().date, MealType::Lunch));
        assert!(mock.calls().contains(&ExecutorCall::Type(
            Field::DeliveryInstructions,
            "Leave at front desk".into()
        )));
    }

    #[tokio::test]
    async fn test_unclickable_item_falls_back_to_next_choice() {
        let mock = MockInteractionExecutor::new().with_unclickable_item("A");
        let outcome = Harness::new()
            .run(&mock, fixtures::menu_with_backup_main())
            .await;

        assert!(outcome.is_success(), "{:?}", outcome.failure);
        assert_eq!(outcome.skipped_items, vec!["Grilled Chicken Bowl"]);
        assert_eq!(ids(&outcome.cart), vec!["E", "B", "C"]);
        assert_eq!(outcome.cart.subtotal(), Money::new(17, 0));
    }

    #[tokio::test]
    async fn test_checkout_is_retried_once() {
        let mock = MockInteractionExecutor::new().with_checkout_failures(1);
        let outcome = Harness::new().run(&mock, fixtures::reference_menu()).await;

        assert!(outcome.is_success(), "{:?}", outcome.failure);
        assert_eq!(mock.click_count(&Control::ProceedToCheckout), 2);
        assert_eq!(mock.click_count(&Control::CompleteOrder), 1);
    }

    #[tokio::test]
    async fn test_second_checkout_failure_fails_slot() {
        let mock = MockInteractionExecutor::new().with_checkout_failures(2);
        let outcome = Harness::new().run(&mock, fixtures::reference_menu()).await;

        let failure = outcome.failure.expect("checkout should fail");
        assert_eq!(failure.code(), ErrorCode::ORDER_CHECKOUT_FAILED);
        assert!(!failure.is_fatal());
        assert_eq!(mock.click_count(&Control::ProceedToCheckout), 2);
        assert!(!mock.is_ordered(slot().date, MealType::Lunch));
    }

    #[tokio::test]
    async fn test_unconfirmed_order_fails_verification() {
        let mock = MockInteractionExecutor::new().without_order_recording();
        let outcome = Harness::new().run(&mock, fixtures::reference_menu()).await;

        let failure = outcome.failure.expect("verification should fail");
        assert_eq!(failure.code(), ErrorCode::ORDER_VERIFICATION_FAILED);
        assert_eq!(mock.click_count(&Control::CompleteOrder), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_never_reaches_checkout() {
        let mock = MockInteractionExecutor::new();
        let mut harness = Harness::new();
        harness.profile = DietaryProfile::vegetarian();
        let outcome = harness.run(&mock, fixtures::meat_only_menu()).await;

        let failure = outcome.failure.expect("nothing to order");
        assert_eq!(failure.code(), ErrorCode::ORDER_EMPTY_CART);
        assert!(outcome.cart.is_empty());
        assert_eq!(mock.click_count(&Control::ProceedToCheckout), 0);
    }

    #[tokio::test]
    async fn test_every_add_failing_leaves_empty_cart() {
        let mock = MockInteractionExecutor::new()
            .with_unclickable_item("A")
            .with_unclickable_item("B")
            .with_unclickable_item("C")
            .with_unclickable_item("D");
        let outcome = Harness::new().run(&mock, fixtures::reference_menu()).await;

        assert_eq!(outcome.skipped_items.len(), 4);
        assert_eq!(
            outcome.failure.map(|e| e.code()),
            Some(ErrorCode::ORDER_EMPTY_CART)
        );
    }
}
