use std::{collections::HashSet, fs::File, io, path::Path};

use super::error::{ChangelogError, Result};

fn default_changelog_file() -> String
{
    String::from("CHANGELOG.md")
}

fn default_version_file() -> String
{
    String::from("package.json")
}

fn default_remote() -> String
{
    String::from("origin")
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChangelogDataAuthor
{
    pub name: String,
    pub email: String,
}

impl Default for ChangelogDataAuthor
{
    fn default() -> Self
    {
        ChangelogDataAuthor { name: String::from("github-actions"), email: String::from("actions@github.com") }
    }
}

/// Settings read from `.changelog.json`, every field is optional.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ChangelogData
{
    #[serde(default = "default_changelog_file")]
    pub changelog_file: String,

    // JSON manifest holding a top level `version` field.
    #[serde(default = "default_version_file")]
    pub version_file: String,

    #[serde(default)]
    pub commit_author: ChangelogDataAuthor,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub exclude_commit_from_author_names: Vec<String>,
}

impl Default for ChangelogData
{
    fn default() -> Self
    {
        ChangelogData {
            changelog_file: default_changelog_file(),
            version_file: default_version_file(),
            commit_author: ChangelogDataAuthor::default(),
            remote: default_remote(),
            exclude_commit_from_author_names: Vec::new(),
        }
    }
}

impl ChangelogData
{
    /// Loads the settings file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<ChangelogData>
    {
        if !path.exists()
        {
            log::debug!("Settings File: `{}` does not exist, using defaults.", path.display());
            return Ok(ChangelogData::default());
        }

        let file = File::open(path)?;
        let reader = io::BufReader::new(file);
        let data: ChangelogData = serde_json::from_reader(reader)?;
        Ok(data)
    }

    /// Authors from the settings file merged with the ones given as an input.
    pub fn excluded_authors(&self, exclude_commit_from_author_names_json: Option<&str>) -> Result<HashSet<String>>
    {
        let mut authors: HashSet<String> = self.exclude_commit_from_author_names.iter().cloned().collect();
        if let Some(json) = exclude_commit_from_author_names_json
        {
            authors.extend(parse_author_names(json)?);
        }
        Ok(authors)
    }
}

/// Parses the `exclude_commit_from_author_names_json` input, a JSON array of names.
pub fn parse_author_names(json: &str) -> Result<Vec<String>>
{
    if json.trim().is_empty()
    {
        return Ok(Vec::new());
    }

    serde_json::from_str::<Vec<String>>(json)
        .map_err(|e| ChangelogError::config(format!("exclude_commit_from_author_names_json must be a JSON array of strings: {}", e)))
}

#[test]
fn test_defaults()
{
    let data = ChangelogData::default();
    assert_eq!(data.changelog_file, "CHANGELOG.md");
    assert_eq!(data.version_file, "package.json");
    assert_eq!(data.commit_author.email, "actions@github.com");
    assert_eq!(data.remote, "origin");
}

#[test]
fn test_load_missing_file()
{
    let dir = tempfile::tempdir().unwrap();
    let data = ChangelogData::load(&dir.path().join(".changelog.json")).unwrap();
    assert_eq!(data, ChangelogData::default());
}

#[test]
fn test_load_partial_file()
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".changelog.json");
    std::fs::write(&path, r#"{ "changelog_file": "docs/CHANGES.md", "exclude_commit_from_author_names": ["bot"] }"#).unwrap();

    let data = ChangelogData::load(&path).unwrap();
    assert_eq!(data.changelog_file, "docs/CHANGES.md");
    assert_eq!(data.version_file, "package.json");
    assert_eq!(data.exclude_commit_from_author_names, vec!["bot".to_string()]);
}

#[test]
fn test_load_rejects_unknown_fields()
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".changelog.json");
    std::fs::write(&path, r#"{ "changelogFile": "x.md" }"#).unwrap();

    assert!(matches!(ChangelogData::load(&path), Err(ChangelogError::Json(_))));
}

#[test]
fn test_excluded_authors()
{
    let data = ChangelogData { exclude_commit_from_author_names: vec!["renovate".to_string()], ..Default::default() };

    let authors = data.excluded_authors(Some(r#"["bot", "github-actions"]"#)).unwrap();
    assert_eq!(authors, maplit::hashset! { "renovate".to_string(), "bot".to_string(), "github-actions".to_string() });

    assert_eq!(data.excluded_authors(None).unwrap().len(), 1);
    assert_eq!(data.excluded_authors(Some("")).unwrap().len(), 1);
}

#[test]
fn test_parse_author_names_malformed()
{
    assert!(matches!(parse_author_names("bot"), Err(ChangelogError::Config(_))));
    assert!(matches!(parse_author_names(r#"{"bot": 1}"#), Err(ChangelogError::Config(_))));
}
