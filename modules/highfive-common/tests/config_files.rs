use std::fs;

use highfive_common::{Config, ConfigError, FileSource, ParameterSource};

const CONFIG: &str = r#"
[dev]
base-url = "https://example.org/search?q="
batch-size = 20
num-retries = 3
retry-backoff-factor = 0.5
names-of-interest = ["Katie"]
communities-of-interest = ["Langley", "Surrey"]
smtp-host = "smtp.example.org"
from-email = "tracker@example.org"
to-email = "placeholder@example.org"
"#;

const SECRETS: &str = r#"
[dev]
to-email = "me@example.org"
smtp-password = "hunter2"
"#;

#[test]
fn secrets_file_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let secrets_path = dir.path().join("secrets.toml");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(&secrets_path, SECRETS).unwrap();

    let source = FileSource::load("dev", &[config_path.as_path(), secrets_path.as_path()]).unwrap();
    assert_eq!(source.lookup("to-email").as_deref(), Some("me@example.org"));

    let config = Config::from_source(&source).unwrap();
    let email = config.email.unwrap();
    assert_eq!(email.to, "me@example.org");
    assert_eq!(email.smtp_password.as_deref(), Some("hunter2"));
    assert_eq!(config.communities_of_interest, vec!["Langley", "Surrey"]);
}

#[test]
fn missing_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, CONFIG).unwrap();
    let absent = dir.path().join("secrets.toml");

    let source = FileSource::load("dev", &[config_path.as_path(), absent.as_path()]).unwrap();
    assert_eq!(source.lookup("to-email").as_deref(), Some("placeholder@example.org"));
}

#[test]
fn unparsable_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[dev\nbatch-size = ").unwrap();

    let err = FileSource::load("dev", &[config_path.as_path()]).err().unwrap();
    assert!(matches!(err, ConfigError::File { .. }));
}

#[test]
fn no_files_means_missing_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("config.toml");

    let source = FileSource::load("dev", &[absent.as_path()]).unwrap();
    let err = Config::from_source(&source).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}
