use async_trait::async_trait;

use crate::libs::{commits::Commit, error::{ChangelogError, Result}};

/// Read-only view of the hosted repository.
#[async_trait]
pub trait ReleaseSource: Send + Sync
{
    async fn tag_names(&self) -> Result<Vec<String>>;

    /// Commits reachable from `ahead` but not from `behind`, newest first.
    async fn commits_ahead(&self, behind: &str, ahead: &str) -> Result<Vec<Commit>>;

    /// Content of `path` at `reference`, `None` when the file does not exist there.
    async fn read_file(&self, reference: &str, path: &str) -> Result<Option<String>>;

    /// `version` field of the JSON manifest at `reference`.
    async fn manifest_version(&self, reference: &str, manifest: &str) -> Result<Option<String>>
    {
        match self.read_file(reference, manifest).await?
        {
            Some(content) => parse_manifest_version(manifest, &content).map(Some),
            None => Ok(None),
        }
    }
}

pub fn parse_manifest_version(manifest: &str, content: &str) -> Result<String>
{
    let json: serde_json::Value = serde_json::from_str(content)?;
    json.get("version")
        .and_then(|version| version.as_str())
        .map(str::to_string)
        .ok_or_else(|| ChangelogError::manifest(format!("`{}` has no string `version` field", manifest)))
}

#[test]
fn test_parse_manifest_version()
{
    let version = parse_manifest_version("package.json", r#"{ "name": "x", "version": "1.2.3" }"#).unwrap();
    assert_eq!(version, "1.2.3");
}

#[test]
fn test_parse_manifest_version_missing_field()
{
    assert!(matches!(parse_manifest_version("package.json", r#"{ "name": "x" }"#), Err(ChangelogError::Manifest(_))));
    assert!(matches!(parse_manifest_version("package.json", r#"{ "version": 1 }"#), Err(ChangelogError::Manifest(_))));
    assert!(matches!(parse_manifest_version("package.json", "not json"), Err(ChangelogError::Json(_))));
}
