use std::{collections::HashSet, sync::OnceLock};

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit
{
    pub message: String,
    pub author_name: String,
}

impl Commit
{
    pub fn new(message: impl Into<String>, author_name: impl Into<String>) -> Commit
    {
        Commit { message: message.into(), author_name: author_name.into() }
    }
}

// Messages that never make it into the changelog.
fn noise_regexes() -> &'static [Regex]
{
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [r"(?i)changelog", r"^Merge branch ", r"^GitBook: "]
            .iter()
            .map(|pattern| Regex::new(pattern).expect("noise regex is valid"))
            .collect()
    })
}

/// Renders the markdown body of a changelog entry.
///
/// `commits` is newest first, as the commit range comes back; the body lists
/// them oldest first, one `- message  ` item per line.
pub fn build_body(commits: &[Commit], excluded_authors: &HashSet<String>) -> String
{
    commits
        .iter()
        .rev()
        .filter(|commit| !excluded_authors.contains(&commit.author_name))
        .map(|commit| commit.message.as_str())
        .filter(|message| !noise_regexes().iter().any(|regex| regex.is_match(message)))
        .map(|message| format!("- {}  ", message))
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
use maplit::hashset;

#[test]
fn test_build_body_scenario()
{
    // Newest first.
    let commits = vec![
        Commit::new("Add feature", "alice"),
        Commit::new("Fix bug", "bot"),
        Commit::new("Merge branch 'x'", "alice"),
    ];

    let body = build_body(&commits, &hashset! { "bot".to_string() });
    assert_eq!(body, "- Add feature  ");
}

#[test]
fn test_build_body_is_chronological()
{
    let commits = vec![
        Commit::new("third", "alice"),
        Commit::new("second", "bob"),
        Commit::new("first", "alice"),
    ];

    assert_eq!(build_body(&commits, &HashSet::new()), "- first  \n- second  \n- third  ");
}

#[test]
fn test_build_body_excludes_authors()
{
    let excluded = hashset! { "dependabot[bot]".to_string(), "github-actions".to_string() };
    let commits = vec![
        Commit::new("Bump lodash", "dependabot[bot]"),
        Commit::new("Release", "github-actions"),
        Commit::new("Keep me", "Dependabot[bot]"),
        Commit::new("Keep me too", "carol"),
    ];

    let body = build_body(&commits, &excluded);
    assert_eq!(body, "- Keep me too  \n- Keep me  ");
}

#[test]
fn test_build_body_changelog_is_case_insensitive()
{
    let commits = vec![
        Commit::new("Update CHANGELOG v1.2.0", "bot"),
        Commit::new("tweak the changeLog generator", "alice"),
        Commit::new("Docs: changelog.md typo", "alice"),
        Commit::new("Real work", "alice"),
    ];

    assert_eq!(build_body(&commits, &HashSet::new()), "- Real work  ");
}

#[test]
fn test_build_body_prefixes_are_exact()
{
    let commits = vec![
        Commit::new("Merge branch 'main' into dev", "alice"),
        Commit::new("GitBook: [main] 3 pages modified", "gitbook"),
        Commit::new("merge branch lowercase stays", "alice"),
        Commit::new("gitbook: lowercase stays", "alice"),
        Commit::new("Revert \"Merge branch 'x'\"", "alice"),
        Commit::new("Merge pull request #12 from x/y", "alice"),
    ];

    let body = build_body(&commits, &HashSet::new());
    assert_eq!(
        body,
        "- Merge pull request #12 from x/y  \n- Revert \"Merge branch 'x'\"  \n- gitbook: lowercase stays  \n- merge branch lowercase stays  "
    );
}

#[test]
fn test_build_body_empty()
{
    assert_eq!(build_body(&[], &HashSet::new()), "");

    let commits = vec![Commit::new("Update changelog v1.0.1", "alice")];
    assert_eq!(build_body(&commits, &HashSet::new()), "");
}
