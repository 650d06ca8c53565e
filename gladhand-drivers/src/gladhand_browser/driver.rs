use crate::gladhand_browser::{page::GladhandPage, pacing::Pacer};
use anyhow::Result;
use fantoccini::{Client, ClientBuilder};
use gladhand_common::GladhandError;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info};
use webdriver::capabilities::Capabilities;

/// Default chromedriver endpoint; `GLADHAND_WEBDRIVER_URL` overrides it to
/// support remote services.
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// Two ways in: [`GladhandDriver::launch`] starts a fresh browser that the
/// driver owns and later closes; [`GladhandDriver::attach`] borrows an
/// already-running Chrome via its remote-debugging port and never tears it
/// down.
pub struct GladhandDriver {
    client: Client,
    owns_browser: bool,
}

impl GladhandDriver {
    /// Start a new browser session through the WebDriver service.
    pub async fn launch(headless: bool) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();

        let mut args = vec![
            "--window-size=1920,1080".to_string(),
            "--disable-notifications".to_string(),
            "--no-sandbox".to_string(),
        ];
        if headless {
            args.push("--headless".to_string());
            args.push("--disable-gpu".to_string());
        }
        chrome_opts.insert("args".to_string(), json!(args));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let endpoint = webdriver_url();
        debug!(%endpoint, "starting browser session");
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&endpoint)
            .await?;

        Ok(Self {
            client,
            owns_browser: true,
        })
    }

    /// Attach to an already-running Chrome exposing a debugging port.
    ///
    /// The session is borrowed: [`GladhandDriver::close`] will not quit it,
    /// so the user keeps their window after the run.
    pub async fn attach(port: u16) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert(
            "debuggerAddress".to_string(),
            json!(format!("127.0.0.1:{port}")),
        );
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let endpoint = webdriver_url();
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&endpoint)
            .await
            .map_err(|error| GladhandError::Attach {
                port,
                source: error.into(),
            })?;

        info!(port, "connected to existing Chrome session");
        Ok(Self {
            client,
            owns_browser: false,
        })
    }

    /// Hand out a page wrapper sharing this driver's session.
    pub fn page(&self, pacer: Pacer) -> GladhandPage {
        GladhandPage::new(self.client.clone(), pacer)
    }

    /// Close the underlying browser session, unless it was only borrowed.
    pub async fn close(self) -> Result<()> {
        if self.owns_browser {
            self.client.close().await?;
        }
        Ok(())
    }
}

fn webdriver_url() -> String {
    std::env::var("GLADHAND_WEBDRIVER_URL").unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string())
}
