//! Abstraction layers for external collaborators
//!
//! This module provides trait-based abstractions for the browsing session
//! and the credential source, so the ordering logic can be driven by a real
//! browser driver or by the in-memory mock site in tests.

pub mod credentials;
pub mod driver;
pub mod executor;
pub mod mock;

pub use credentials::{
    CredentialProvider, Credentials, EnvCredentialProvider, StaticCredentialProvider,
};
pub use driver::DriverExecutor;
pub use executor::{ClickOutcome, Control, Field, InteractionExecutor, MealSection, PageState};
pub use mock::{ExecutorCall, MockInteractionExecutor};
