use std::{collections::HashSet, fmt::Display};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::libs::{
    bump::{classify, BumpType, ReleaseBump},
    changelog::{prepend, ChangelogEntry},
    commits::build_body,
    error::{ChangelogError, Result},
    tag::latest_release_tag,
    version::SemanticVersion,
};

use super::source::ReleaseSource;

// Version assumed for a released branch without a manifest.
const UNVERSIONED: &str = "0.0.0";

#[derive(Debug, Clone)]
pub struct UpdateParams
{
    pub owner: String,
    pub repo: String,
    // Bare branch name, without `refs/heads/`.
    pub branch: String,
    pub excluded_authors: HashSet<String>,
    pub version_file: String,
}

/// Why a run ends without touching the changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason
{
    FirstRelease,
    BranchNotFound { owner: String, repo: String, behind: String, branch: String },
    ReleaseCandidate { branch: String, version: String },
    SameVersion { branch: String, behind: String },
}

impl Display for SkipReason
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self
        {
            SkipReason::FirstRelease => write!(f, "It's the first release, not editing the changelog"),
            SkipReason::BranchNotFound { owner, repo, behind, branch } =>
                write!(f, "{}/{}#{} probably does not exist (branch: {})", owner, repo, behind, branch),
            SkipReason::ReleaseCandidate { branch, version } =>
                write!(f, "Version on {} is {}, it's a release candidate, not recorded in the changelog", branch, version),
            SkipReason::SameVersion { branch, behind } =>
                write!(f, "Versions on {} and {} are identical, not editing the changelog", branch, behind),
        }
    }
}

/// Everything needed to write the new changelog section once the branch is checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate
{
    pub branch: String,
    pub version: String,
    pub bump: ReleaseBump,
    pub body: String,
    pub commit_message: String,
}

impl PendingUpdate
{
    pub fn render(&self, date: NaiveDate, existing: &str) -> String
    {
        let entry = ChangelogEntry {
            version: self.version.clone(),
            date,
            bump: self.bump,
            body: self.body.clone(),
        };
        prepend(&entry, existing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome
{
    Skipped(SkipReason),
    Update(PendingUpdate),
}

impl Outcome
{
    pub fn should_commit(&self) -> bool
    {
        matches!(self, Outcome::Update(_))
    }
}

fn skip(reason: SkipReason) -> Result<Outcome>
{
    warn!("{}", reason);
    Ok(Outcome::Skipped(reason))
}

/// Decides whether `params.branch` carries a new release since the latest tag,
/// and if so what goes into the changelog.
pub async fn plan<S>(source: &S, params: &UpdateParams) -> Result<Outcome>
where
    S: ReleaseSource + ?Sized,
{
    let branch = params.branch.as_str();

    let tags = source.tag_names().await?;
    let behind = match latest_release_tag(tags.iter().map(String::as_str))
    {
        Some(tag) => tag.name,
        None => return skip(SkipReason::FirstRelease),
    };
    info!("Latest Release: {}", behind);

    let commits = match source.commits_ahead(&behind, branch).await
    {
        Ok(commits) => commits,
        Err(error) =>
        {
            debug!("Commit range {}...{} failed: {}", behind, branch, error);
            return skip(SkipReason::BranchNotFound {
                owner: params.owner.clone(),
                repo: params.repo.clone(),
                behind,
                branch: branch.to_string(),
            });
        },
    };
    info!("Commits: {}", commits.len());

    let (behind_version, ahead_version) = tokio::try_join!(
        source.manifest_version(&behind, &params.version_file),
        source.manifest_version(branch, &params.version_file),
    )?;

    let ahead_version = ahead_version.ok_or_else(|| {
        ChangelogError::manifest(format!("`{}` not found on {}", params.version_file, branch))
    })?;
    let ahead = SemanticVersion::parse(&ahead_version)?;

    if ahead.is_release_candidate()
    {
        return skip(SkipReason::ReleaseCandidate { branch: branch.to_string(), version: ahead_version });
    }

    let behind_version = behind_version.unwrap_or_else(|| UNVERSIONED.to_string());
    let behind_parsed = SemanticVersion::parse(&behind_version)?;

    let bump = classify(&ahead, &behind_parsed)?;
    info!("Bump: {} ({} -> {})", bump, behind_version, ahead_version);

    let release = match bump
    {
        BumpType::Major => ReleaseBump::Major,
        BumpType::Minor => ReleaseBump::Minor,
        BumpType::Patch => ReleaseBump::Patch,
        BumpType::Same => return skip(SkipReason::SameVersion { branch: branch.to_string(), behind }),
        BumpType::Rc => return Err(ChangelogError::Invariant(format!("{} classified as rc after the release candidate check", ahead))),
    };

    Ok(Outcome::Update(PendingUpdate {
        branch: branch.to_string(),
        commit_message: format!("Update changelog v{}", ahead_version),
        version: ahead_version,
        bump: release,
        body: build_body(&commits, &params.excluded_authors),
    }))
}

#[cfg(test)]
use super::mock::MockSource;
#[cfg(test)]
use crate::libs::commits::Commit;

#[cfg(test)]
fn params(branch: &str) -> UpdateParams
{
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();

    UpdateParams {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        branch: branch.to_string(),
        excluded_authors: maplit::hashset! { "bot".to_string() },
        version_file: "package.json".to_string(),
    }
}

#[cfg(test)]
fn released() -> MockSource
{
    MockSource::new()
        .with_tag("v1.2.3")
        .with_tag("v1.1.0")
        .with_version("v1.2.3", "1.2.3")
        .with_range("v1.2.3", "main", vec![
            Commit::new("Add feature", "alice"),
            Commit::new("Fix bug", "bot"),
            Commit::new("Merge branch 'x'", "alice"),
        ])
}

#[tokio::test]
async fn test_plan_minor_release()
{
    let source = released().with_version("main", "1.3.0");

    let outcome = plan(&source, &params("main")).await.unwrap();
    assert!(outcome.should_commit());

    let update = match outcome
    {
        Outcome::Update(update) => update,
        other => panic!("Expected an update: {:?}", other),
    };
    assert_eq!(update.bump, ReleaseBump::Minor);
    assert_eq!(update.version, "1.3.0");
    assert_eq!(update.body, "- Add feature  ");
    assert_eq!(update.commit_message, "Update changelog v1.3.0");

    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let document = update.render(date, "old\n");
    assert_eq!(document, "## **1.3.0** (2024-06-01)  \n  \n- Add feature    \n  \nold\n");
}

#[tokio::test]
async fn test_plan_reads_both_versions()
{
    let source = released().with_version("main", "2.0.0");

    let outcome = plan(&source, &params("main")).await.unwrap();
    assert!(matches!(outcome, Outcome::Update(PendingUpdate { bump: ReleaseBump::Major, .. })));

    let mut reads = source.reads();
    reads.sort();
    assert_eq!(reads, vec![
        ("main".to_string(), "package.json".to_string()),
        ("v1.2.3".to_string(), "package.json".to_string()),
    ]);
}

#[tokio::test]
async fn test_plan_first_release()
{
    let source = MockSource::new().with_tag("nightly").with_tag("v1.0.0-rc.1");

    let outcome = plan(&source, &params("main")).await.unwrap();
    assert_eq!(outcome, Outcome::Skipped(SkipReason::FirstRelease));
    assert!(!outcome.should_commit());
    assert!(source.reads().is_empty());
}

#[tokio::test]
async fn test_plan_branch_not_found()
{
    let source = released().with_version("gone", "1.3.0");

    let outcome = plan(&source, &params("gone")).await.unwrap();
    assert_eq!(outcome, Outcome::Skipped(SkipReason::BranchNotFound {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        behind: "v1.2.3".to_string(),
        branch: "gone".to_string(),
    }));
    assert!(source.reads().is_empty());
}

#[tokio::test]
async fn test_plan_same_version()
{
    let source = MockSource::new()
        .with_tag("2.0.0")
        .with_version("2.0.0", "2.0.0")
        .with_version("main", "2.0.0")
        .with_range("2.0.0", "main", vec![Commit::new("Tweak", "alice")]);

    let outcome = plan(&source, &params("main")).await.unwrap();
    assert_eq!(outcome, Outcome::Skipped(SkipReason::SameVersion { branch: "main".to_string(), behind: "2.0.0".to_string() }));
}

#[tokio::test]
async fn test_plan_release_candidate()
{
    // Lower than the released version, the rc check still wins.
    let source = released().with_version("main", "1.0.0-rc.1");

    let outcome = plan(&source, &params("main")).await.unwrap();
    assert_eq!(outcome, Outcome::Skipped(SkipReason::ReleaseCandidate { branch: "main".to_string(), version: "1.0.0-rc.1".to_string() }));
}

#[tokio::test]
async fn test_plan_missing_released_manifest_counts_as_unversioned()
{
    let source = MockSource::new()
        .with_tag("v0.1.0")
        .with_version("main", "0.1.0")
        .with_range("v0.1.0", "main", vec![Commit::new("Initial", "alice")]);

    let outcome = plan(&source, &params("main")).await.unwrap();
    let update = match outcome
    {
        Outcome::Update(update) => update,
        other => panic!("Expected an update: {:?}", other),
    };
    assert_eq!(update.bump, ReleaseBump::Minor);
    assert_eq!(update.body, "- Initial  ");
}

#[tokio::test]
async fn test_plan_malformed_version_aborts()
{
    let source = released().with_version("main", "1.3");

    let result = plan(&source, &params("main")).await;
    assert!(matches!(result, Err(ChangelogError::MalformedVersion(_))), "{:?}", result);
}

#[tokio::test]
async fn test_plan_missing_manifest_on_branch_aborts()
{
    let source = released();

    let result = plan(&source, &params("main")).await;
    assert!(matches!(result, Err(ChangelogError::Manifest(_))), "{:?}", result);
}

#[tokio::test]
async fn test_plan_regression_aborts()
{
    let source = released().with_version("main", "1.2.0");

    let result = plan(&source, &params("main")).await;
    assert!(matches!(result, Err(ChangelogError::VersionRegression { .. })), "{:?}", result);
}

#[test]
fn test_skip_reason_display()
{
    let reason = SkipReason::BranchNotFound {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        behind: "v1.0.0".to_string(),
        branch: "dev".to_string(),
    };
    assert_eq!(reason.to_string(), "acme/widgets#v1.0.0 probably does not exist (branch: dev)");
    assert!(SkipReason::FirstRelease.to_string().contains("first release"));
}
