use async_trait::async_trait;
use log::debug;

use crate::libs::{commits::Commit, error::Result};

use super::source::ReleaseSource;

// The compare endpoint caps a single response, larger ranges are paged.
const COMPARE_PER_PAGE: usize = 100;

#[derive(Debug, serde::Serialize)]
struct PageParams
{
    per_page: usize,
    page: usize,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Comparison
{
    #[serde(default)]
    total_commits: usize,
    commits: Vec<ComparisonCommit>,
}

#[derive(Debug, serde::Deserialize)]
struct ComparisonCommit
{
    commit: ComparisonCommitDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ComparisonCommitDetail
{
    message: String,
    author: Option<ComparisonAuthor>,
}

#[derive(Debug, serde::Deserialize)]
struct ComparisonAuthor
{
    name: String,
}

impl Comparison
{
    // Appends the next page, pages are fetched oldest first.
    fn merge(&mut self, page: Comparison) -> bool
    {
        let received = page.commits.len();
        self.total_commits = self.total_commits.max(page.total_commits);
        self.commits.extend(page.commits);

        received == COMPARE_PER_PAGE && self.commits.len() < self.total_commits
    }

    // The compare endpoint lists the commits oldest first.
    fn into_commits(self) -> Vec<Commit>
    {
        self.commits
            .into_iter()
            .rev()
            .map(|c| Commit::new(c.commit.message, c.commit.author.map(|a| a.name).unwrap_or_default()))
            .collect()
    }
}

fn is_not_found(error: &octocrab::Error) -> bool
{
    matches!(error, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

/// GitHub REST API backed `ReleaseSource`.
pub struct GitHubSource
{
    octocrab: octocrab::Octocrab,
    owner: String,
    repo: String,
}

impl GitHubSource
{
    pub fn new(token: Option<String>, owner: &str, repo: &str) -> Result<GitHubSource>
    {
        let mut builder = octocrab::Octocrab::builder();
        if let Some(token) = token
        {
            builder = builder.personal_token(token);
        }

        Ok(GitHubSource { octocrab: builder.build()?, owner: owner.to_string(), repo: repo.to_string() })
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource
{
    async fn tag_names(&self) -> Result<Vec<String>>
    {
        let page = self.octocrab
            .repos(&self.owner, &self.repo)
            .list_tags()
            .per_page(100u8)
            .send()
            .await?;

        let tags = self.octocrab.all_pages(page).await?;
        debug!("Tags on {}/{}: {}", self.owner, self.repo, tags.len());

        Ok(tags.into_iter().map(|tag| tag.name).collect())
    }

    async fn commits_ahead(&self, behind: &str, ahead: &str) -> Result<Vec<Commit>>
    {
        let route = format!("/repos/{}/{}/compare/{}...{}", self.owner, self.repo, behind, ahead);

        let mut comparison = Comparison::default();
        let mut page = 1;
        loop
        {
            let params = PageParams { per_page: COMPARE_PER_PAGE, page };
            let next: Comparison = self.octocrab.get(&route, Some(&params)).await?;
            if !comparison.merge(next)
            {
                break;
            }
            page += 1;
        }
        debug!("Compare {}...{}: {} of {} commits", behind, ahead, comparison.commits.len(), comparison.total_commits);

        Ok(comparison.into_commits())
    }

    async fn read_file(&self, reference: &str, path: &str) -> Result<Option<String>>
    {
        let result = self.octocrab
            .repos(&self.owner, &self.repo)
            .get_content()
            .path(path)
            .r#ref(reference)
            .send()
            .await;

        match result
        {
            Ok(content) => Ok(content.items.into_iter().next().and_then(|item| item.decoded_content())),
            Err(error) if is_not_found(&error) =>
            {
                debug!("{}/{}#{}: `{}` not found", self.owner, self.repo, reference, path);
                Ok(None)
            },
            Err(error) => Err(error.into()),
        }
    }
}

#[test]
fn test_comparison_into_commits()
{
    let json = r#"{
        "status": "ahead",
        "commits": [
            { "sha": "a1", "commit": { "message": "first", "author": { "name": "alice", "email": "a@x.io", "date": "2024-01-01T00:00:00Z" } } },
            { "sha": "b2", "commit": { "message": "second", "author": null } }
        ]
    }"#;

    let comparison: Comparison = serde_json::from_str(json).unwrap();
    assert_eq!(
        comparison.into_commits(),
        vec![Commit::new("second", ""), Commit::new("first", "alice")]
    );
}

#[cfg(test)]
fn comparison_page(total_commits: usize, messages: std::ops::Range<usize>) -> Comparison
{
    Comparison {
        total_commits,
        commits: messages
            .map(|i| ComparisonCommit {
                commit: ComparisonCommitDetail {
                    message: format!("commit {}", i),
                    author: Some(ComparisonAuthor { name: "alice".to_string() }),
                },
            })
            .collect(),
    }
}

#[test]
fn test_comparison_merge_pages()
{
    let mut comparison = Comparison::default();
    assert!(comparison.merge(comparison_page(230, 0..100)));
    assert!(comparison.merge(comparison_page(230, 100..200)));
    assert!(!comparison.merge(comparison_page(230, 200..230)));

    let commits = comparison.into_commits();
    assert_eq!(commits.len(), 230);
    assert_eq!(commits.first().unwrap().message, "commit 229");
    assert_eq!(commits.last().unwrap().message, "commit 0");
}

#[test]
fn test_comparison_merge_stops_at_total()
{
    let mut comparison = Comparison::default();
    assert!(!comparison.merge(comparison_page(100, 0..100)));
    assert_eq!(comparison.commits.len(), 100);

    // A short page ends the walk even when the total says otherwise.
    let mut comparison = Comparison::default();
    assert!(!comparison.merge(comparison_page(500, 0..42)));
}
