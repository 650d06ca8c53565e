use crate::gladhand_browser::pacing::Pacer;
use anyhow::Result;
use fantoccini::elements::Element;
use fantoccini::key::Key;
use fantoccini::{Client, Locator};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Poll cadence for bounded element waits.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// High‑level page wrapper providing element queries where absence is data,
/// not an error.
///
/// Optional UI is probed with [`GladhandPage::find_with_timeout`]; only
/// WebDriver transport faults surface as errors.
pub struct GladhandPage {
    pub(crate) client: Client,
    pub(crate) pacer: Pacer,
}

impl GladhandPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client, pacer: Pacer) -> Self {
        Self { client, pacer }
    }

    /// The pacer shared by this page and the elements it hands out.
    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    /// Navigate to `url`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client.goto(url).await.map_err(anyhow::Error::from)
    }

    /// Return the current page URL.
    pub async fn current_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::from)
    }

    /// Probe for an element once, without waiting.
    pub async fn find(&self, locator: Locator<'_>) -> Result<Option<GladhandElement>> {
        let mut found = self.client.find_all(locator).await?;
        if found.is_empty() {
            Ok(None)
        } else {
            Ok(Some(GladhandElement::new(found.remove(0), &self.pacer)))
        }
    }

    /// Poll for an element until it appears or `timeout` elapses.
    ///
    /// `None` after the timeout is the expected-absence signal; callers treat
    /// it as a branch, never as a failure.
    pub async fn find_with_timeout(
        &self,
        locator: Locator<'_>,
        timeout: Duration,
    ) -> Result<Option<GladhandElement>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.find(locator).await? {
                return Ok(Some(element));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Try each CSS selector in order; first match wins.
    ///
    /// Returns the element together with the index of the selector that
    /// matched, so callers can log which markup variant the page used.
    pub async fn find_first_matching(
        &self,
        selectors: &[&str],
    ) -> Result<Option<(GladhandElement, usize)>> {
        for (index, selector) in selectors.iter().enumerate() {
            let mut found = self.client.find_all(Locator::Css(selector)).await?;
            if !found.is_empty() {
                if index > 0 {
                    debug!(target: "browser.selector", %selector, index, "fallback selector matched");
                }
                return Ok(Some((GladhandElement::new(found.remove(0), &self.pacer), index)));
            }
        }
        Ok(None)
    }

    /// Find zero or more elements.
    pub async fn find_all(&self, locator: Locator<'_>) -> Result<Vec<GladhandElement>> {
        let elements = self.client.find_all(locator).await?;

        Ok(elements
            .into_iter()
            .map(|element| GladhandElement::new(element, &self.pacer))
            .collect())
    }

    /// Poll until no element matches `locator`, up to `timeout`.
    ///
    /// `true` means the element disappeared; `false` means it was still
    /// present when the window closed.
    pub async fn wait_until_gone(&self, locator: Locator<'_>, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.client.find_all(locator).await?.is_empty() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

// ==========================
// GladhandElement Definition
// ==========================

#[derive(Clone)]
/// Wrapper for DOM elements that provides typed helpers consistent with
/// [`GladhandPage`].
pub struct GladhandElement {
    pub element: Element,
    pacer: Pacer,
}

impl GladhandElement {
    /// Construct an element wrapper.
    pub fn new(element: Element, pacer: &Pacer) -> Self {
        Self {
            element,
            pacer: pacer.clone(),
        }
    }

    /// Click the element. Consumes the wrapper; a click may navigate or
    /// re-render, invalidating the element reference.
    pub async fn click(self) -> Result<()> {
        self.element.click().await?;
        Ok(())
    }

    /// Send text to the element in one go.
    pub async fn send_keys(&self, text: &str) -> Result<()> {
        self.element
            .send_keys(text)
            .await
            .map_err(anyhow::Error::from)
    }

    /// Type into the element using human‑like timings.
    pub async fn type_human(&self, text: &str) -> Result<()> {
        self.pacer.type_text_human_like(&self.element, text).await
    }

    /// Send the Enter key.
    pub async fn press_enter(&self) -> Result<()> {
        self.element
            .send_keys(&char::from(Key::Enter).to_string())
            .await
            .map_err(anyhow::Error::from)
    }

    /// Empty the field: native clear plus select-all + delete, which also
    /// covers inputs that re-populate from client-side state.
    pub async fn clear_text(&self) -> Result<()> {
        self.element.clear().await?;
        let select_all: String = [char::from(Key::Control), 'a', char::from(Key::Null)]
            .iter()
            .collect();
        self.element.send_keys(&select_all).await?;
        self.element
            .send_keys(&char::from(Key::Delete).to_string())
            .await?;
        Ok(())
    }

    /// Return the element's visible text.
    pub async fn text(&self) -> Result<String> {
        self.element.text().await.map_err(anyhow::Error::from)
    }

    /// Read an attribute value.
    pub async fn attr(&self, attribute: &str) -> Result<Option<String>> {
        self.element
            .attr(attribute)
            .await
            .map_err(anyhow::Error::from)
    }

    /// Read a live DOM property (e.g. an input's current `value`).
    pub async fn prop(&self, prop: &str) -> Result<Option<String>> {
        self.element.prop(prop).await.map_err(anyhow::Error::from)
    }

    /// Find zero or more descendant elements.
    pub async fn find_all(&self, locator: Locator<'_>) -> Result<Vec<GladhandElement>> {
        let elements = self.element.find_all(locator).await?;
        Ok(elements
            .into_iter()
            .map(|element| GladhandElement::new(element, &self.pacer))
            .collect())
    }
}
