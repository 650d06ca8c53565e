use anyhow::Result;
use fantoccini::elements::Element;
use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Per-character typing delay bounds, in seconds.
const KEYSTROKE_MIN_SECS: f64 = 0.05;
const KEYSTROKE_MAX_SECS: f64 = 0.15;

#[derive(Debug, Clone)]
/// Produces randomized human‑like pauses between UI actions.
///
/// Default bounds come from configuration; call sites narrow or widen them
/// per step.
pub struct Pacer {
    min_secs: f64,
    max_secs: f64,
}

impl Pacer {
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Sleep for a random duration within the configured default bounds.
    pub async fn wait(&self) -> Duration {
        self.wait_between(self.min_secs, self.max_secs).await
    }

    /// Sleep for a random duration in `[min_secs, max_secs]` seconds and
    /// report how long the pause actually was.
    pub async fn wait_between(&self, min_secs: f64, max_secs: f64) -> Duration {
        let secs = if max_secs > min_secs {
            let mut rng = OsRng;
            rng.gen_range(min_secs..=max_secs)
        } else {
            // Tolerate collapsed or inverted bounds from configuration.
            min_secs
        };
        let elapsed = Duration::from_secs_f64(secs.max(0.0));
        sleep(elapsed).await;
        elapsed
    }

    /// Type the provided text with small random delays between characters.
    pub async fn type_text_human_like(&self, element: &Element, text: &str) -> Result<()> {
        for ch in text.chars() {
            element.send_keys(&ch.to_string()).await?;
            self.wait_between(KEYSTROKE_MIN_SECS, KEYSTROKE_MAX_SECS).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_between_stays_in_bounds() {
        let pacer = Pacer::new(0.0, 0.0);
        let elapsed = pacer.wait_between(0.01, 0.03).await;
        assert!(elapsed >= Duration::from_millis(10));
        assert!(elapsed <= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn wait_uses_configured_defaults() {
        let pacer = Pacer::new(0.005, 0.01);
        let elapsed = pacer.wait().await;
        assert!(elapsed >= Duration::from_millis(5));
        assert!(elapsed <= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn collapsed_bounds_use_the_minimum() {
        let pacer = Pacer::new(0.0, 0.0);
        let elapsed = pacer.wait().await;
        assert_eq!(elapsed, Duration::ZERO);
    }
}
