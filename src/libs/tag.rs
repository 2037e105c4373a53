use super::version::SemanticVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag
{
    pub name: String,
    pub version: SemanticVersion,
}

/// `refs/heads/main` -> `main`, anything else is returned untouched.
///
/// On a push `github.ref` is the full ref, on a pull request `github.head_ref`
/// is already the bare branch name.
pub fn strip_branch_ref(branch: &str) -> &str
{
    branch.strip_prefix("refs/heads/").unwrap_or(branch)
}

// Tags are either `1.2.3` or `v1.2.3`.
fn parse_tag(name: &str) -> Option<SemanticVersion>
{
    SemanticVersion::parse(name.strip_prefix('v').unwrap_or(name)).ok()
}

/// Highest released (non release candidate) version among `tag_names`.
///
/// Tags that are not versions are ignored.
pub fn latest_release_tag<'a, I>(tag_names: I) -> Option<ReleaseTag>
where
    I: IntoIterator<Item = &'a str>,
{
    tag_names
        .into_iter()
        .filter_map(|name| parse_tag(name).map(|version| ReleaseTag { name: name.to_string(), version }))
        .filter(|tag| !tag.version.is_release_candidate())
        .max_by(|a, b| a.version.cmp(&b.version))
}

#[test]
fn test_strip_branch_ref()
{
    assert_eq!(strip_branch_ref("refs/heads/main"), "main");
    assert_eq!(strip_branch_ref("refs/heads/feature/refs/heads/x"), "feature/refs/heads/x");
    assert_eq!(strip_branch_ref("dev"), "dev");
    assert_eq!(strip_branch_ref("refs/tags/v1.0.0"), "refs/tags/v1.0.0");
}

#[test]
fn test_latest_release_tag()
{
    let tags = ["v1.2.0", "1.10.0", "v1.9.3", "nightly", "v2.0.0-rc.1", "1.10.0-rc.4"];
    let latest = latest_release_tag(tags.iter().copied()).unwrap();
    assert_eq!(latest.name, "1.10.0");
    assert_eq!(latest.version, SemanticVersion::new(1, 10, 0));
}

#[test]
fn test_latest_release_tag_keeps_prefix()
{
    let latest = latest_release_tag(["v0.1.0", "v0.2.0"]).unwrap();
    assert_eq!(latest.name, "v0.2.0");
}

#[test]
fn test_latest_release_tag_none()
{
    assert_eq!(latest_release_tag(Vec::<&str>::new()), None);
    assert_eq!(latest_release_tag(["latest", "v3.0.0-rc.1"]), None);
}
