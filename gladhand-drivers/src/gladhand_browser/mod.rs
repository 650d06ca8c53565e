//! Browser session plumbing: driver bootstrap, page/element helpers, pacing.
//!
//! Submodules wrap the `fantoccini` WebDriver client so the rest of the bot
//! can probe optional UI (modals, buttons that may or may not exist) and get
//! back an explicit present/absent answer instead of an error.
pub mod driver;
pub mod page;
pub mod pacing;

pub use driver::GladhandDriver;
pub use page::{GladhandElement, GladhandPage};
pub use pacing::Pacer;
