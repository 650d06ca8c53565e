//! Live Handshake session.
//!
//! [`HandshakeSession`] owns the page wrapper and implements both halves of
//! the automation: the board-level flows the runner drives (login, search,
//! pagination) and the per-posting [`ApplyPage`] operations the apply flow
//! steps through. Element absence comes back as `Ok(false)` / `Ok(None)`
//! throughout; `Err` is reserved for a broken WebDriver session.

use crate::apply::{run_apply_flow, ApplyPage, ApplyReport, FillSummary};
use crate::ledger::JobDetails;
use crate::runner::JobBoard;
use crate::selectors;
use async_trait::async_trait;
use gladhand_common::{GladhandError, Result};
use gladhand_config::GladhandConfig;
use gladhand_drivers::gladhand_browser::{GladhandPage, Pacer};
use gladhand_drivers::Locator;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Environment variables holding the NetID credentials. Values are read at
/// login time, typed into the form, and dropped; they are never logged.
pub const USERNAME_ENV: &str = "GLADHAND_USERNAME";
pub const PASSWORD_ENV: &str = "GLADHAND_PASSWORD";

const LOGIN_ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);
const POST_LOGIN_MODAL_TIMEOUT: Duration = Duration::from_secs(5);
const FILTER_BUTTON_TIMEOUT: Duration = Duration::from_secs(5);
const SEARCH_INPUT_TIMEOUT: Duration = Duration::from_secs(10);
const EXTERNAL_APPLY_TIMEOUT: Duration = Duration::from_secs(5);
const APPLY_BUTTON_TIMEOUT: Duration = Duration::from_secs(3);
const SUBMIT_BUTTON_TIMEOUT: Duration = Duration::from_secs(4);
const MODAL_GONE_TIMEOUT: Duration = Duration::from_secs(5);
const DOCUMENT_BUTTON_TIMEOUT: Duration = Duration::from_secs(2);
const NEXT_PAGE_CARDS_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HandshakeSession {
    page: GladhandPage,
    config: GladhandConfig,
}

impl HandshakeSession {
    pub fn new(page: GladhandPage, config: GladhandConfig) -> Self {
        Self { page, config }
    }

    fn pacer(&self) -> &Pacer {
        self.page.pacer()
    }

    /// Sign in through the university NetID flow.
    ///
    /// `Ok(false)` means some login element never showed up; credentials
    /// missing from the environment abort with a typed error before any
    /// navigation happens.
    pub async fn login(&self) -> Result<bool> {
        let username = credential(USERNAME_ENV)?;
        let password = credential(PASSWORD_ENV)?;

        info!("logging into Handshake");
        self.page.goto(&self.config.handshake.login_url).await?;
        self.pacer().wait().await;

        let Some(netid_link) = self
            .page
            .find_with_timeout(
                Locator::XPath(selectors::NETID_LOGIN_LINK_XPATH),
                LOGIN_ELEMENT_TIMEOUT,
            )
            .await?
        else {
            warn!("NetID login link never appeared");
            return Ok(false);
        };
        netid_link.click().await?;
        self.pacer().wait().await;

        let Some(username_input) = self
            .page
            .find_with_timeout(
                Locator::Id(selectors::USERNAME_FIELD_ID),
                LOGIN_ELEMENT_TIMEOUT,
            )
            .await?
        else {
            warn!("credential form never appeared");
            return Ok(false);
        };
        username_input.send_keys(&username).await?;

        let Some(password_input) = self
            .page
            .find(Locator::Id(selectors::PASSWORD_FIELD_ID))
            .await?
        else {
            warn!("password field missing from credential form");
            return Ok(false);
        };
        password_input.send_keys(&password).await?;
        self.pacer().wait().await;

        let Some(submit) = self
            .page
            .find(Locator::Css(selectors::LOGIN_SUBMIT_BUTTON))
            .await?
        else {
            warn!("submit button missing from credential form");
            return Ok(false);
        };
        submit.click().await?;

        // Give the SSO redirect time to land back on the board.
        self.pacer().wait_between(3.0, 5.0).await;

        match self
            .page
            .find_with_timeout(
                Locator::Css(selectors::CLOSE_MODAL_BUTTON),
                POST_LOGIN_MODAL_TIMEOUT,
            )
            .await
        {
            Ok(Some(close)) => {
                if let Err(error) = close.click().await {
                    debug!(%error, "could not close post-login modal");
                }
            }
            Ok(None) => debug!("no post-login modal detected"),
            Err(error) => debug!(%error, "post-login modal probe failed"),
        }

        Ok(true)
    }

    /// Jump straight to the pre-filtered job search view.
    pub async fn open_filtered_search(&self) -> Result<bool> {
        let target = &self.config.handshake.filtered_search_url;
        info!(url = %target, "navigating to job search");
        self.page.goto(target).await?;
        self.pacer().wait_between(1.0, 2.0).await;

        if self
            .page
            .find_with_timeout(Locator::Css(selectors::FILTER_BUTTON), FILTER_BUTTON_TIMEOUT)
            .await?
            .is_none()
        {
            warn!("filter controls never appeared on the search page");
            return Ok(false);
        }

        let current = self.page.current_url().await?;
        if current
            .to_lowercase()
            .contains(selectors::JOB_POSTINGS_PATH_MARKER)
        {
            info!("job postings page ready");
            Ok(true)
        } else {
            warn!(url = %current, "navigation did not reach the postings page");
            Ok(false)
        }
    }

    /// Attach-mode sanity check: the borrowed browser should already be on
    /// the board, logged in, with filters applied.
    pub async fn warn_if_off_site(&self) -> Result<()> {
        let current = self.page.current_url().await?;
        if !current.contains(selectors::HANDSHAKE_HOST_MARKER) {
            warn!(url = %current, "existing session is not on Handshake, navigate there first");
        }
        Ok(())
    }

    /// Click the picker for a previously uploaded document, if the posting
    /// asks for one and a fragment is configured. Best-effort by design: a
    /// posting without the picker is the common case.
    async fn attach_document(&self, fragment: Option<&str>) -> usize {
        let Some(fragment) = fragment else { return 0 };
        let xpath = selectors::document_button_xpath(fragment);
        match self
            .page
            .find_with_timeout(Locator::XPath(&xpath), DOCUMENT_BUTTON_TIMEOUT)
            .await
        {
            Ok(Some(button)) => match button.click().await {
                Ok(()) => {
                    debug!(fragment, "selected document");
                    1
                }
                Err(error) => {
                    debug!(fragment, %error, "document picker rejected the click");
                    0
                }
            },
            Ok(None) => {
                debug!(fragment, "no document selection needed");
                0
            }
            Err(error) => {
                debug!(fragment, %error, "document lookup failed");
                0
            }
        }
    }

    /// First non-empty text found walking a selector fallback chain.
    async fn text_from_any(&self, chain: &[&str]) -> Result<Option<String>> {
        let mut rest = chain;
        while let Some((element, index)) = self.page.find_first_matching(rest).await? {
            match element.text().await {
                Ok(text) if !text.is_empty() => return Ok(Some(text)),
                Ok(_) => {}
                Err(error) => debug!(%error, "selector candidate unreadable"),
            }
            rest = &rest[index + 1..];
        }
        Ok(None)
    }

    /// Text of a div sitting next to an icon identified by its SVG path
    /// prefix. The path data survives Handshake's class-name hashing, so it
    /// is the only stable anchor for the location and employment rows.
    async fn icon_labelled_text(
        &self,
        path_prefix: &str,
        keywords: &[&str],
    ) -> Result<Option<String>> {
        let xpath = format!(
            "//*[local-name()='path' and starts-with(@d, '{path_prefix}')]\
             /ancestor::div[position() <= 3]//div"
        );
        for candidate in self.page.find_all(Locator::XPath(&xpath)).await? {
            let text = match candidate.text().await {
                Ok(text) => text,
                Err(error) => {
                    debug!(%error, "skipping unreadable candidate");
                    continue;
                }
            };
            let lowered = text.to_lowercase();
            if keywords.iter().any(|keyword| lowered.contains(keyword)) {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl JobBoard for HandshakeSession {
    async fn search_title(&self, title: &str) -> Result<bool> {
        let Some(input) = self
            .page
            .find_with_timeout(
                Locator::Css(selectors::JOBS_SEARCH_INPUT),
                SEARCH_INPUT_TIMEOUT,
            )
            .await?
        else {
            warn!("search input never appeared");
            return Ok(false);
        };

        input.clear_text().await?;
        self.pacer().wait_between(1.0, 2.0).await;

        input.type_human(title).await?;
        input.press_enter().await?;
        debug!(title, "submitted search");

        // Let the results shuffle in before counting cards.
        self.pacer().wait_between(2.0, 3.0).await;
        Ok(true)
    }

    async fn current_results_url(&self) -> Result<String> {
        Ok(self.page.current_url().await?)
    }

    async fn collect_job_urls(&self) -> Result<Vec<String>> {
        self.pacer().wait_between(2.0, 3.0).await;

        let Some(container) = self
            .page
            .find(Locator::Css(selectors::JOB_CARDS_CONTAINER))
            .await?
        else {
            warn!("no job cards found");
            return Ok(Vec::new());
        };

        let mut urls = Vec::new();
        for link in container
            .find_all(Locator::Css(selectors::JOB_CARD_LINK))
            .await?
        {
            if let Some(href) = link.attr("href").await? {
                urls.push(href);
            }
        }

        debug!(count = urls.len(), "collected job links");
        Ok(urls)
    }

    async fn goto_job(&self, url: &str) -> Result<()> {
        Ok(self.page.goto(url).await?)
    }

    async fn apply_to_current(&self) -> ApplyReport {
        run_apply_flow(self).await
    }

    async fn advance_to_next_page(&self, results_url: &str) -> Result<bool> {
        let Some(next_url) = next_page_url(results_url) else {
            warn!(url = results_url, "could not derive a next-page url");
            return Ok(false);
        };

        info!(url = %next_url, "navigating to next page");
        self.page.goto(&next_url).await?;
        self.pacer().wait_between(2.0, 3.0).await;

        match self
            .page
            .find_with_timeout(
                Locator::Css(selectors::JOB_CARDS_CONTAINER),
                NEXT_PAGE_CARDS_TIMEOUT,
            )
            .await?
        {
            Some(container) => {
                let links = container
                    .find_all(Locator::Css(selectors::JOB_CARD_LINK))
                    .await?;
                if links.is_empty() {
                    info!("no job cards on the next page");
                    Ok(false)
                } else {
                    debug!(count = links.len(), "next page ready");
                    Ok(true)
                }
            }
            None => {
                info!("no job cards on the next page");
                Ok(false)
            }
        }
    }

    async fn pause(&self, min_secs: f64, max_secs: f64) {
        self.pacer().wait_between(min_secs, max_secs).await;
    }
}

#[async_trait]
impl ApplyPage for HandshakeSession {
    async fn external_apply_present(&self) -> Result<bool> {
        let found = self
            .page
            .find_with_timeout(
                Locator::XPath(selectors::APPLY_EXTERNALLY_XPATH),
                EXTERNAL_APPLY_TIMEOUT,
            )
            .await?;
        Ok(found.is_some())
    }

    async fn open_application_form(&self) -> Result<bool> {
        let Some(button) = self
            .page
            .find_with_timeout(
                Locator::XPath(selectors::APPLY_BUTTON_XPATH),
                APPLY_BUTTON_TIMEOUT,
            )
            .await?
        else {
            return Ok(false);
        };

        self.pacer().wait_between(0.0, 1.0).await;
        button.click().await?;
        debug!("clicked apply");
        self.pacer().wait_between(1.0, 2.0).await;
        Ok(true)
    }

    async fn fill_required_fields(&self) -> Result<FillSummary> {
        let mut summary = FillSummary::default();

        summary.documents += self
            .attach_document(self.config.documents.resume.as_deref())
            .await;
        summary.documents += self
            .attach_document(self.config.documents.cover_letter.as_deref())
            .await;
        summary.documents += self
            .attach_document(self.config.documents.transcript.as_deref())
            .await;

        for field in self
            .page
            .find_all(Locator::Css(selectors::REQUIRED_FIELD))
            .await?
        {
            for dropdown in field.find_all(Locator::Css(selectors::DROPDOWN)).await? {
                let options = dropdown
                    .find_all(Locator::Css(selectors::DROPDOWN_OPTION))
                    .await?;
                // Index 0 is the "Select an option" placeholder.
                if let Some(option) = options.into_iter().nth(1) {
                    option.click().await?;
                    summary.dropdowns += 1;
                    debug!("selected dropdown option");
                }
            }

            for text_input in field.find_all(Locator::Css(selectors::TEXT_INPUT)).await? {
                if text_input.prop("value").await?.as_deref() == Some("") {
                    text_input.send_keys(selectors::DEFAULT_TEXT_ANSWER).await?;
                    summary.text_inputs += 1;
                    debug!("filled text input");
                }
            }

            let radios = field.find_all(Locator::Css(selectors::RADIO_INPUT)).await?;
            if let Some(radio) = radios.into_iter().next() {
                radio.click().await?;
                summary.radios += 1;
                debug!("selected radio button");
            }

            let checkboxes = field
                .find_all(Locator::Css(selectors::CHECKBOX_INPUT))
                .await?;
            if let Some(checkbox) = checkboxes.into_iter().next() {
                checkbox.click().await?;
                summary.checkboxes += 1;
                debug!("ticked checkbox");
            }
        }

        Ok(summary)
    }

    async fn submit_application(&self) -> Result<bool> {
        let Some(button) = self
            .page
            .find_with_timeout(
                Locator::XPath(selectors::SUBMIT_APPLICATION_XPATH),
                SUBMIT_BUTTON_TIMEOUT,
            )
            .await?
        else {
            return Ok(false);
        };

        self.pacer().wait().await;
        button.click().await?;
        debug!("clicked submit application");
        self.pacer().wait_between(1.0, 2.0).await;
        Ok(true)
    }

    async fn apply_modal_gone(&self) -> Result<bool> {
        Ok(self
            .page
            .wait_until_gone(
                Locator::Css(selectors::APPLY_MODAL_CONTENT),
                MODAL_GONE_TIMEOUT,
            )
            .await?)
    }

    async fn capture_details(&self) -> Result<JobDetails> {
        let job_title = self.text_from_any(selectors::JOB_TITLE_SELECTORS).await?;
        let employer = self.text_from_any(selectors::EMPLOYER_NAME_SELECTORS).await?;
        let location = self
            .icon_labelled_text(
                selectors::LOCATION_ICON_PATH_PREFIX,
                selectors::LOCATION_KEYWORDS,
            )
            .await?;
        let employment_type = self
            .icon_labelled_text(
                selectors::EMPLOYMENT_ICON_PATH_PREFIX,
                selectors::EMPLOYMENT_KEYWORDS,
            )
            .await?;

        Ok(JobDetails {
            job_title,
            employer,
            location,
            employment_type,
        })
    }
}

fn credential(var: &'static str) -> Result<String> {
    std::env::var(var).map_err(|_| GladhandError::MissingCredentials { var })
}

/// Derive the URL of the next results page.
///
/// The board paginates with a `page` query parameter; a URL without one is
/// page 1, so the next page is `page=2`. A `page` value that is not a number,
/// or that has no representable successor, yields `None` and ends pagination.
pub(crate) fn next_page_url(current: &str) -> Option<String> {
    let mut url = Url::parse(current).ok()?;
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut bumped = false;
    for (key, value) in pairs.iter_mut() {
        if key == "page" {
            let next = value
                .parse::<u32>()
                .ok()
                .and_then(|page| page.checked_add(1))?;
            *value = next.to_string();
            bumped = true;
            break;
        }
    }
    if !bumped {
        pairs.push(("page".to_string(), "2".to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(&pairs);
    Some(url.into())
}
