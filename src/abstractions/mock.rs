//! In-memory ordering site for tests and dry runs
//!
//! [`MockInteractionExecutor`] simulates the pieces of the ordering site the
//! core talks to: a login form that can reject credentials, date pages with
//! per-meal menus and order status, a cart, and a two-step checkout. Clones
//! share state, so a test can hand one clone to the orchestrator and inspect
//! the other afterwards.

use super::executor::{ClickOutcome, Control, Field, InteractionExecutor, MealSection, PageState};
use crate::error::{ErrorCode, RelishError, Result};
use crate::menu::MenuItem;
use crate::schedule::{MealType, SiteUrls};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const ORDERED_INDICATOR: &str = "Order Placed";
const LOGIN_ERROR: &str = "Incorrect email or password";

/// A request received by the mock, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorCall {
    Navigate(String),
    Observe,
    Click(Control),
    Type(Field, String),
    Close,
}

#[derive(Debug)]
struct SiteState {
    current_url: Option<String>,
    authenticated: bool,
    login_error: Option<String>,
    login_failures_remaining: u32,
    welcome_pending: bool,
    welcome_seen: bool,
    unavailable: HashSet<NaiveDate>,
    ordered: HashSet<(NaiveDate, MealType)>,
    default_menus: BTreeMap<MealType, Vec<MenuItem>>,
    menus: HashMap<(NaiveDate, MealType), Vec<MenuItem>>,
    unclickable: HashSet<String>,
    checkout_failures_remaining: u32,
    record_orders: bool,
    cart_meal: Option<MealType>,
    cart: Vec<String>,
    checkout_open: bool,
    navigation_delay: Option<Duration>,
    expire_at_navigation: Option<usize>,
    navigations: usize,
    calls: Vec<ExecutorCall>,
    closed: bool,
}

impl Default for SiteState {
    fn default() -> Self {
        Self {
            current_url: None,
            authenticated: false,
            login_error: None,
            login_failures_remaining: 0,
            welcome_pending: false,
            welcome_seen: false,
            unavailable: HashSet::new(),
            ordered: HashSet::new(),
            default_menus: BTreeMap::new(),
            menus: HashMap::new(),
            unclickable: HashSet::new(),
            checkout_failures_remaining: 0,
            record_orders: true,
            cart_meal: None,
            cart: Vec::new(),
            checkout_open: false,
            navigation_delay: None,
            expire_at_navigation: None,
            navigations: 0,
            calls: Vec::new(),
            closed: false,
        }
    }
}

impl SiteState {
    fn current_date(&self) -> Option<NaiveDate> {
        self.current_url.as_deref().and_then(SiteUrls::date_from_url)
    }

    fn page(&self) -> PageState {
        let mut page = PageState {
            url: self.current_url.clone(),
            authenticated: self.authenticated,
            login_error: self.login_error.clone(),
            welcome_prompt: self.authenticated && self.welcome_pending,
            ..PageState::default()
        };
        let date = match self.current_date() {
            Some(date) if self.authenticated => date,
            _ => return page,
        };
        if self.unavailable.contains(&date) {
            page.date_available = false;
            return page;
        }
        for meal in MealType::ALL {
            let status_indicators = if self.ordered.contains(&(date, meal)) {
                vec![ORDERED_INDICATOR.to_string()]
            } else {
                Vec::new()
            };
            let menu = self
                .menus
                .get(&(date, meal))
                .or_else(|| self.default_menus.get(&meal))
                .cloned()
                .unwrap_or_default();
            page.meals.insert(
                meal,
                MealSection {
                    status_indicators,
                    menu,
                },
            );
        }
        page
    }

    fn click(&mut self, control: &Control) -> Result<ClickOutcome> {
        let outcome = match control {
            Control::LoginSubmit => {
                if self.login_failures_remaining > 0 {
                    self.login_failures_remaining -= 1;
                    self.authenticated = false;
                    self.login_error = Some(LOGIN_ERROR.to_string());
                } else {
                    self.authenticated = true;
                    self.login_error = None;
                    self.welcome_pending = !self.welcome_seen;
                }
                ClickOutcome::Clicked
            }
            Control::WelcomeContinue if self.welcome_pending => {
                self.welcome_pending = false;
                self.welcome_seen = true;
                ClickOutcome::Clicked
            }
            Control::WelcomeContinue => ClickOutcome::NotFound,
            Control::AddToCart { meal, item_id, .. } => {
                if !self.authenticated || self.unclickable.contains(item_id) {
                    ClickOutcome::NotFound
                } else {
                    self.cart_meal = Some(*meal);
                    self.cart.push(item_id.clone());
                    ClickOutcome::Clicked
                }
            }
            Control::ProceedToCheckout => {
                if self.cart.is_empty() {
                    ClickOutcome::NotFound
                } else if self.checkout_failures_remaining > 0 {
                    self.checkout_failures_remaining -= 1;
                    return Err(RelishError::executor_with_code(
                        ErrorCode::EXEC_ACTION_FAILED,
                        "checkout page did not load",
                        Some(control.to_string()),
                    ));
                } else {
                    self.checkout_open = true;
                    ClickOutcome::Clicked
                }
            }
            Control::CompleteOrder => {
                if !self.checkout_open {
                    ClickOutcome::NotFound
                } else {
                    if self.record_orders {
                        if let (Some(date), Some(meal)) = (self.current_date(), self.cart_meal) {
                            self.ordered.insert((date, meal));
                        }
                    }
                    self.cart.clear();
                    self.cart_meal = None;
                    self.checkout_open = false;
                    ClickOutcome::Clicked
                }
            }
        };
        Ok(outcome)
    }
}

/// Simulated ordering site implementing [`InteractionExecutor`]
#[derive(Debug, Clone, Default)]
pub struct MockInteractionExecutor {
    state: Arc<Mutex<SiteState>>,
}

impl MockInteractionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn site(&self) -> MutexGuard<'_, SiteState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Menu shown for `meal` on every date without a specific menu
    pub fn with_default_menu(self, meal: MealType, items: Vec<MenuItem>) -> Self {
        self.site().default_menus.insert(meal, items);
        self
    }

    pub fn with_menu(self, date: NaiveDate, meal: MealType, items: Vec<MenuItem>) -> Self {
        self.site().menus.insert((date, meal), items);
        self
    }

    /// Reject the next `count` login submissions
    pub fn with_login_failures(self, count: u32) -> Self {
        self.site().login_failures_remaining = count;
        self
    }

    pub fn with_unavailable_date(self, date: NaiveDate) -> Self {
        self.site().unavailable.insert(date);
        self
    }

    pub fn with_existing_order(self, date: NaiveDate, meal: MealType) -> Self {
        self.site().ordered.insert((date, meal));
        self
    }

    /// Make an item's add-to-cart control unclickable
    pub fn with_unclickable_item(self, item_id: &str) -> Self {
        self.site().unclickable.insert(item_id.to_string());
        self
    }

    /// Fail the next `count` proceed-to-checkout requests
    pub fn with_checkout_failures(self, count: u32) -> Self {
        self.site().checkout_failures_remaining = count;
        self
    }

    /// Accept checkouts without the order ever showing up on the date page
    pub fn without_order_recording(self) -> Self {
        self.site().record_orders = false;
        self
    }

    pub fn with_navigation_delay(self, delay: Duration) -> Self {
        self.site().navigation_delay = Some(delay);
        self
    }

    /// Drop the login session, as if it expired
    pub fn expire_session(&self) {
        self.site().authenticated = false;
    }

    /// Expire the login session when the `n`th navigation (1-based) lands
    pub fn with_session_expiry_at_navigation(self, n: usize) -> Self {
        self.site().expire_at_navigation = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<ExecutorCall> {
        self.site().calls.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.site().closed
    }

    pub fn is_ordered(&self, date: NaiveDate, meal: MealType) -> bool {
        self.site().ordered.contains(&(date, meal))
    }

    /// Item ids whose add-to-cart control was clicked successfully, in order
    pub fn added_items(&self) -> Vec<String> {
        let site = self.site();
        site.calls
            .iter()
            .filter_map(|call| match call {
                ExecutorCall::Click(Control::AddToCart { item_id, .. })
                    if !site.unclickable.contains(item_id) =>
                {
                    Some(item_id.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn click_count(&self, control: &Control) -> usize {
        self.site()
            .calls
            .iter()
            .filter(|call| matches!(call, ExecutorCall::Click(c) if c == control))
            .count()
    }
}

#[async_trait]
impl InteractionExecutor for MockInteractionExecutor {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let delay = {
            let mut site = self.site();
            site.calls.push(ExecutorCall::Navigate(url.to_string()));
            site.navigation_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut site = self.site();
        site.navigations += 1;
        if site.expire_at_navigation == Some(site.navigations) {
            site.authenticated = false;
        }
        site.current_url = Some(url.to_string());
        site.checkout_open = false;
        Ok(())
    }

    async fn observe_page_state(&mut self) -> Result<PageState> {
        let mut site = self.site();
        site.calls.push(ExecutorCall::Observe);
        Ok(site.page())
    }

    async fn click_control(&mut self, control: &Control) -> Result<ClickOutcome> {
        let mut site = self.site();
        site.calls.push(ExecutorCall::Click(control.clone()));
        site.click(control)
    }

    async fn type_text(&mut self, field: Field, value: &str) -> Result<()> {
        let recorded = match field {
            Field::Password => "<redacted>".to_string(),
            _ => value.to_string(),
        };
        self.site().calls.push(ExecutorCall::Type(field, recorded));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut site = self.site();
        site.calls.push(ExecutorCall::Close);
        site.closed = true;
        Ok(())
    }
}
