//! Driver layer for browser automation.
//!
//! This crate exposes the browser driver and page/element helpers the bot
//! uses to log in, search, and walk application forms.
//!
//! - [`gladhand_browser::driver::GladhandDriver`]: WebDriver client wrapper (launch or attach)
//! - [`gladhand_browser::page::GladhandPage`]: DOM lookups where absence is data, not an error
//! - [`gladhand_browser::pacing::Pacer`]: human‑like timings and typing
pub mod gladhand_browser;

pub use fantoccini::Locator;
