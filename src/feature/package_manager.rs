use std::fmt::Display;

use log::debug;

use crate::libs::error::Result;

use super::source::ReleaseSource;

const YARN_LOCKFILE: &str = "yarn.lock";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager
{
    Npm,
    Yarn,
}

impl Display for PackageManager
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self
        {
            PackageManager::Npm => write!(f, "npm"),
            PackageManager::Yarn => write!(f, "yarn"),
        }
    }
}

/// A branch is a yarn project when it has a `yarn.lock`, npm otherwise.
pub async fn detect<S>(source: &S, branch: &str) -> Result<PackageManager>
where
    S: ReleaseSource + ?Sized,
{
    let package_manager = match source.read_file(branch, YARN_LOCKFILE).await?
    {
        Some(_) => PackageManager::Yarn,
        None => PackageManager::Npm,
    };
    debug!("Branch {} is using {}", branch, package_manager);
    Ok(package_manager)
}

#[cfg(test)]
use super::mock::MockSource;

#[tokio::test]
async fn test_detect_yarn()
{
    let source = MockSource::new().with_file("main", "yarn.lock", "# yarn lockfile v1\n");
    assert_eq!(detect(&source, "main").await.unwrap(), PackageManager::Yarn);
}

#[tokio::test]
async fn test_detect_npm()
{
    let source = MockSource::new()
        .with_file("main", "yarn.lock", "")
        .with_file("dev", "package-lock.json", "{}");

    assert_eq!(detect(&source, "dev").await.unwrap(), PackageManager::Npm);
    assert_eq!(PackageManager::Npm.to_string(), "npm");
}
