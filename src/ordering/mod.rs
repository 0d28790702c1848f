//! Ordering core: session control, slot classification, checkout and the
//! run over the whole schedule window

pub mod checkout;
pub mod classifier;
pub mod orchestrator;
pub mod report;
pub mod session;

pub use checkout::{CheckoutOrchestrator, CheckoutOutcome, CheckoutState, CHECKOUT_ATTEMPTS};
pub use classifier::{MealStateClassifier, SlotStatus, DEFAULT_ORDERED_INDICATORS};
pub use orchestrator::{OrderingOrchestrator, OrderingSettings};
pub use report::{RunReport, SlotOutcome};
pub use session::{BrowsingSession, SessionController, LOGIN_RETRIES};
