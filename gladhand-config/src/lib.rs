//! Loader for the bot configuration with YAML + environment overlays.
//!
//! `gladhand.yaml` holds the job-board URLs, the ordered search titles, and
//! pacing/verbosity settings. Values may reference environment variables as
//! `${VAR}`; expansion is recursive with a depth cap so cyclic definitions
//! terminate. `GLADHAND_`-prefixed environment variables overlay the file
//! (path separator `__`, e.g. `GLADHAND_SETTINGS__VERBOSE_LOGGING`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level configuration consumed by the session, runner, and pacer.
#[derive(Debug, Clone, Deserialize)]
pub struct GladhandConfig {
    pub handshake: HandshakeSection,
    pub job_search: JobSearchSection,
    #[serde(default)]
    pub documents: DocumentsSection,
    #[serde(default)]
    pub settings: SettingsSection,
}

/// Entry points on the job board.
#[derive(Debug, Clone, Deserialize)]
pub struct HandshakeSection {
    pub login_url: String,
    /// Pre-filtered results view the bot returns to before each search.
    pub filtered_search_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSearchSection {
    /// Search terms, processed in order.
    pub titles: Vec<String>,
}

/// Aria-label fragments identifying the document pickers on the apply form.
/// Any entry left unset skips that picker entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentsSection {
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsSection {
    /// Default lower bound for randomized pauses, in seconds.
    #[serde(default = "default_min_wait")]
    pub min_wait_time: f64,
    /// Default upper bound for randomized pauses, in seconds.
    #[serde(default = "default_max_wait")]
    pub max_wait_time: f64,
    /// Results pages visited per search term before moving on.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// When true the default log filter drops to `debug` and the compact
    /// per-job summary lines are suppressed in favour of step detail.
    #[serde(default = "default_verbose")]
    pub verbose_logging: bool,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            min_wait_time: default_min_wait(),
            max_wait_time: default_max_wait(),
            max_pages: default_max_pages(),
            verbose_logging: default_verbose(),
        }
    }
}

fn default_min_wait() -> f64 {
    2.0
}
fn default_max_wait() -> f64 {
    4.0
}
fn default_max_pages() -> u32 {
    3
}
fn default_verbose() -> bool {
    true
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct GladhandConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GladhandConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GladhandConfigLoader {
    /// Start with sensible defaults: YAML file + `GLADHAND_` env overrides.
    ///
    /// ```
    /// use gladhand_config::GladhandConfigLoader;
    ///
    /// let config = GladhandConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// handshake:
    ///   login_url: "https://board.example.test/login"
    ///   filtered_search_url: "https://board.example.test/stu/postings"
    /// job_search:
    ///   titles: ["software engineer"]
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.job_search.titles, vec!["software engineer"]);
    /// assert_eq!(config.settings.max_pages, 3);
    /// assert!(config.settings.verbose_logging);
    /// assert!(config.documents.resume.is_none());
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("GLADHAND").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// `${VAR}` placeholders are expanded against the environment before the
    /// strongly typed config materialises.
    ///
    /// ```
    /// use gladhand_config::GladhandConfigLoader;
    ///
    /// std::env::set_var("JOB_BOARD_HOST", "board.example.test");
    ///
    /// let config = GladhandConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// handshake:
    ///   login_url: "https://${JOB_BOARD_HOST}/login"
    ///   filtered_search_url: "https://${JOB_BOARD_HOST}/stu/postings"
    /// job_search:
    ///   titles: ["data analyst"]
    /// settings:
    ///   max_pages: 5
    ///   verbose_logging: false
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.handshake.login_url, "https://board.example.test/login");
    /// assert_eq!(config.settings.max_pages, 5);
    /// assert!(!config.settings.verbose_logging);
    ///
    /// std::env::remove_var("JOB_BOARD_HOST");
    /// ```
    pub fn load(self) -> Result<GladhandConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first so placeholders can be expanded
        // anywhere in the tree.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: GladhandConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
