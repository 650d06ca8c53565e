use gladhand_config::GladhandConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
handshake:
  login_url: "https://board.example.test/login"
  filtered_search_url: "https://board.example.test/stu/postings?employment=full-time"
job_search:
  titles:
    - "software engineer"
    - "backend developer"
documents:
  resume: "resume.pdf"
  transcript: "transcript.pdf"
settings:
  min_wait_time: 1.0
  max_wait_time: 2.5
  max_pages: 4
  verbose_logging: false
"#;
    let p = write_yaml(&tmp, "gladhand.yaml", file_yaml);

    let config = GladhandConfigLoader::new()
        .with_file(p)
        .load()
        .expect("load bot config");

    assert_eq!(config.handshake.login_url, "https://board.example.test/login");
    assert_eq!(config.job_search.titles.len(), 2);
    assert_eq!(config.documents.resume.as_deref(), Some("resume.pdf"));
    assert!(config.documents.cover_letter.is_none());
    assert_eq!(config.settings.min_wait_time, 1.0);
    assert_eq!(config.settings.max_wait_time, 2.5);
    assert_eq!(config.settings.max_pages, 4);
    assert!(!config.settings.verbose_logging);
}

#[test]
#[serial]
fn test_settings_default_when_omitted() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
handshake:
  login_url: "https://board.example.test/login"
  filtered_search_url: "https://board.example.test/stu/postings"
job_search:
  titles: ["data engineer"]
"#;
    let p = write_yaml(&tmp, "gladhand.yaml", file_yaml);

    let config = GladhandConfigLoader::new()
        .with_file(p)
        .load()
        .expect("load bot config");

    assert_eq!(config.settings.min_wait_time, 2.0);
    assert_eq!(config.settings.max_wait_time, 4.0);
    assert_eq!(config.settings.max_pages, 3);
    assert!(config.settings.verbose_logging);
    assert!(config.documents.resume.is_none());
}

#[test]
#[serial]
fn test_env_placeholders_expand() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
handshake:
  login_url: "https://${GLADHAND_TEST_HOST}/login"
  filtered_search_url: "https://${GLADHAND_TEST_HOST}/stu/postings"
job_search:
  titles: ["${GLADHAND_TEST_TITLE}"]
"#;
    let p = write_yaml(&tmp, "gladhand.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("GLADHAND_TEST_HOST", Some("board.example.test")),
            ("GLADHAND_TEST_TITLE", Some("site reliability engineer")),
        ],
        || {
            let config = GladhandConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load bot config");

            assert_eq!(
                config.handshake.filtered_search_url,
                "https://board.example.test/stu/postings"
            );
            assert_eq!(config.job_search.titles, vec!["site reliability engineer"]);
        },
    );
}
