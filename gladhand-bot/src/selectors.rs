//! Selector inventory for the Handshake UI.
//!
//! Handshake ships hashed CSS-module class names, so the lookups that depend
//! on them carry a fallback chain from the most specific selector down to a
//! bare tag. Keep new entries in that order.

// Post-login modal
pub const CLOSE_MODAL_BUTTON: &str =
    "button[aria-label='Close modal'][data-hook='close-bootstrapping-follows-modal']";

// Search page
pub const FILTER_BUTTON: &str = "button[data-hook='button'][aria-label='Filter by']";
pub const JOBS_SEARCH_INPUT: &str = "input[aria-label='Jobs or employers']";

// Job cards on the results page
pub const JOB_CARDS_CONTAINER: &str = "div.style__cards___hgLkO";
pub const JOB_CARD_LINK: &str = "a.style__card___LCqKH";

/// Job title lookups, most specific first.
pub const JOB_TITLE_SELECTORS: &[&str] = &[
    "h1.style__job-title__3jVD1",
    "h1[data-testid='job-title']",
    "h1.job-title",
    "h1",
];

/// Employer name lookups, most specific first.
pub const EMPLOYER_NAME_SELECTORS: &[&str] = &[
    "span.style__employer-name__VeAXU",
    "span[data-testid='employer-name']",
    "a.employer-name",
    "div.employer-info span",
    "div.sc-carhra a div.sc-cIUgcF",
    "a[href*='/stu/employers/'] div",
];

// Application form
pub const REQUIRED_FIELD: &str = "div.style__required__1Xkbq";
pub const DROPDOWN: &str = "select";
pub const DROPDOWN_OPTION: &str = "option";
pub const TEXT_INPUT: &str = "input[type='text']";
pub const RADIO_INPUT: &str = "input[type='radio']";
pub const CHECKBOX_INPUT: &str = "input[type='checkbox']";

/// Answer typed into required free-text questions that are still empty.
pub const DEFAULT_TEXT_ANSWER: &str = "Yes";

// University SSO login form
pub const USERNAME_FIELD_ID: &str = "j_username";
pub const PASSWORD_FIELD_ID: &str = "j_password";
pub const LOGIN_SUBMIT_BUTTON: &str = "[name='_eventId_proceed']";
pub const NETID_LOGIN_LINK_XPATH: &str = "//a[contains(@title, 'Log in with your NetId')]";

// Apply controls
pub const APPLY_BUTTON_XPATH: &str = "//span[text()='Apply']";
pub const APPLY_EXTERNALLY_XPATH: &str = "//span[contains(text(), 'Apply Externally')]";
pub const SUBMIT_APPLICATION_XPATH: &str = "//button//span[text()='Submit Application']";
pub const APPLY_MODAL_CONTENT: &str = "span[data-hook='apply-modal-content']";

/// XPath for the button that attaches a previously uploaded document whose
/// aria-label contains `fragment` (usually part of the file name).
pub fn document_button_xpath(fragment: &str) -> String {
    format!("//button[contains(@aria-label, '{fragment}')]")
}

// Job detail icons. The SVG path data survives Handshake's class-name
// hashing, so location and employment type are anchored on a path prefix.
pub const LOCATION_ICON_PATH_PREFIX: &str = "M12 21.75";
pub const EMPLOYMENT_ICON_PATH_PREFIX: &str = "M8.50029 16.75";

/// Substrings that mark a div as holding the job's location text.
pub const LOCATION_KEYWORDS: &[&str] = &["onsite", "remote", "hybrid", "united states"];
/// Substrings that mark a div as holding the employment-type text.
pub const EMPLOYMENT_KEYWORDS: &[&str] = &["full-time", "part-time", "internship"];

// URL markers
pub const HANDSHAKE_HOST_MARKER: &str = "handshake.com";
pub const JOB_POSTINGS_PATH_MARKER: &str = "postings";
