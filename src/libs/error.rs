use thiserror::Error;

use super::version::SemanticVersion;

/// Everything that can abort a run.
///
/// Expected absences (no prior tag, unchanged version, ...) are not errors,
/// see `feature::update::SkipReason`.
#[derive(Error, Debug)]
pub enum ChangelogError
{
    #[error("Malformed version: `{0}` - expected MAJOR.MINOR.PATCH or MAJOR.MINOR.PATCH-rc.N")]
    MalformedVersion(String),

    #[error("Version regression: {behind} -> {ahead}")]
    VersionRegression { behind: SemanticVersion, ahead: SemanticVersion },

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("GitHub request failed: {0}")]
    GitHub(#[from] octocrab::Error),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError
{
    pub fn config(msg: impl Into<String>) -> Self
    {
        ChangelogError::Config(msg.into())
    }

    pub fn manifest(msg: impl Into<String>) -> Self
    {
        ChangelogError::Manifest(msg.into())
    }
}

#[test]
fn test_error_display()
{
    let err = ChangelogError::MalformedVersion("1.2".to_string());
    assert!(err.to_string().starts_with("Malformed version: `1.2`"));

    let err = ChangelogError::VersionRegression {
        behind: SemanticVersion::new(2, 0, 0),
        ahead: SemanticVersion::new(1, 9, 9),
    };
    assert_eq!(err.to_string(), "Version regression: 2.0.0 -> 1.9.9");

    assert_eq!(ChangelogError::config("no owner").to_string(), "Configuration error: no owner");
}

#[test]
fn test_error_from_io()
{
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ChangelogError = io_err.into();
    assert!(err.to_string().contains("I/O error"));
}
