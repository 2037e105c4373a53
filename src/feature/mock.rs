use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::libs::{commits::Commit, error::{ChangelogError, Result}};

use super::source::ReleaseSource;

/// In-memory repository for driving the workflow in tests.
#[derive(Debug, Default)]
pub struct MockSource
{
    pub tags: Vec<String>,
    // (behind, ahead) -> commits, newest first
    pub ranges: HashMap<(String, String), Vec<Commit>>,
    // (reference, path) -> content
    pub files: HashMap<(String, String), String>,
    // Every file read, to check which lookups happened.
    pub reads: Mutex<Vec<(String, String)>>,
}

impl MockSource
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn with_tag(mut self, name: &str) -> Self
    {
        self.tags.push(name.to_string());
        self
    }

    pub fn with_range(mut self, behind: &str, ahead: &str, commits: Vec<Commit>) -> Self
    {
        self.ranges.insert((behind.to_string(), ahead.to_string()), commits);
        self
    }

    pub fn with_file(mut self, reference: &str, path: &str, content: &str) -> Self
    {
        self.files.insert((reference.to_string(), path.to_string()), content.to_string());
        self
    }

    pub fn with_version(self, reference: &str, version: &str) -> Self
    {
        let content = format!(r#"{{ "name": "mock", "version": "{}" }}"#, version);
        self.with_file(reference, "package.json", &content)
    }

    pub fn reads(&self) -> Vec<(String, String)>
    {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReleaseSource for MockSource
{
    async fn tag_names(&self) -> Result<Vec<String>>
    {
        Ok(self.tags.clone())
    }

    async fn commits_ahead(&self, behind: &str, ahead: &str) -> Result<Vec<Commit>>
    {
        self.ranges
            .get(&(behind.to_string(), ahead.to_string()))
            .cloned()
            .ok_or_else(|| ChangelogError::config(format!("No commit range {}...{}", behind, ahead)))
    }

    async fn read_file(&self, reference: &str, path: &str) -> Result<Option<String>>
    {
        self.reads.lock().unwrap().push((reference.to_string(), path.to_string()));
        Ok(self.files.get(&(reference.to_string(), path.to_string())).cloned())
    }
}
