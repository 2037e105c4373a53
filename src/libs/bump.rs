use std::{cmp::Ordering, fmt::Display};

use super::{error::{ChangelogError, Result}, version::SemanticVersion};

/// Coarsest change between the released version and the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpType
{
    Major,
    Minor,
    Patch,
    Same,
    Rc,
}

/// The bump types that are actually written to the changelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseBump
{
    Major,
    Minor,
    Patch,
}

impl ReleaseBump
{
    // Markdown heading, the bigger the release the bigger the heading.
    pub fn heading_marker(&self) -> &'static str
    {
        match self
        {
            ReleaseBump::Major => "#",
            ReleaseBump::Minor => "##",
            ReleaseBump::Patch => "###",
        }
    }
}

impl Display for BumpType
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self
        {
            BumpType::Major => "major",
            BumpType::Minor => "minor",
            BumpType::Patch => "patch",
            BumpType::Same => "same",
            BumpType::Rc => "rc",
        };
        write!(f, "{}", name)
    }
}

/// Classifies `behind -> ahead`.
///
/// A release candidate ahead is always `Rc`, whatever `behind` is. An `ahead`
/// that is lower than `behind` is reported as a regression instead of being
/// folded into `Same`.
pub fn classify(ahead: &SemanticVersion, behind: &SemanticVersion) -> Result<BumpType>
{
    if ahead.is_release_candidate()
    {
        return Ok(BumpType::Rc);
    }

    if ahead.major != behind.major
    {
        return bump_or_regression(ahead.major.cmp(&behind.major), BumpType::Major, ahead, behind);
    }
    if ahead.minor != behind.minor
    {
        return bump_or_regression(ahead.minor.cmp(&behind.minor), BumpType::Minor, ahead, behind);
    }
    if ahead.patch != behind.patch
    {
        return bump_or_regression(ahead.patch.cmp(&behind.patch), BumpType::Patch, ahead, behind);
    }

    Ok(BumpType::Same)
}

fn bump_or_regression(ordering: Ordering, bump: BumpType, ahead: &SemanticVersion, behind: &SemanticVersion) -> Result<BumpType>
{
    match ordering
    {
        Ordering::Greater => Ok(bump),
        _ => Err(ChangelogError::VersionRegression { behind: *behind, ahead: *ahead }),
    }
}

#[cfg(test)]
fn v(text: &str) -> SemanticVersion
{
    SemanticVersion::parse(text).unwrap()
}

#[test]
fn test_classify_minor()
{
    assert_eq!(classify(&v("1.3.0"), &v("1.2.3")).unwrap(), BumpType::Minor);
}

#[test]
fn test_classify_only_coarsest_component_counts()
{
    assert_eq!(classify(&v("2.0.0"), &v("1.9.9")).unwrap(), BumpType::Major);
    assert_eq!(classify(&v("2.5.7"), &v("1.0.0")).unwrap(), BumpType::Major);
    assert_eq!(classify(&v("3.0.0"), &v("2.9.0")).unwrap(), BumpType::Major);
    assert_eq!(classify(&v("1.3.0"), &v("1.2.9")).unwrap(), BumpType::Minor);
    assert_eq!(classify(&v("1.2.4"), &v("1.2.3")).unwrap(), BumpType::Patch);
}

#[test]
fn test_classify_same()
{
    assert_eq!(classify(&v("2.0.0"), &v("2.0.0")).unwrap(), BumpType::Same);
}

#[test]
fn test_classify_release_candidate_ahead()
{
    assert_eq!(classify(&v("1.4.0-rc.1"), &v("1.3.0")).unwrap(), BumpType::Rc);
    assert_eq!(classify(&v("1.4.0-rc.1"), &v("9.9.9")).unwrap(), BumpType::Rc);
    assert_eq!(classify(&v("1.4.0-rc.1"), &v("1.4.0-rc.1")).unwrap(), BumpType::Rc);
}

#[test]
fn test_classify_release_candidate_behind_is_same()
{
    // Only major.minor.patch is compared once ahead is a final release.
    assert_eq!(classify(&v("1.4.0"), &v("1.4.0-rc.3")).unwrap(), BumpType::Same);
}

#[test]
fn test_classify_regression()
{
    for (ahead, behind) in [("1.9.9", "2.0.0"), ("1.2.0", "1.3.0"), ("1.2.2", "1.2.3"), ("1.5.0", "2.0.0")]
    {
        let result = classify(&v(ahead), &v(behind));
        assert!(matches!(result, Err(ChangelogError::VersionRegression { .. })), "{} -> {}: {:?}", behind, ahead, result);
    }
}

#[test]
fn test_heading_markers()
{
    assert_eq!(ReleaseBump::Major.heading_marker(), "#");
    assert_eq!(ReleaseBump::Minor.heading_marker(), "##");
    assert_eq!(ReleaseBump::Patch.heading_marker(), "###");
    assert_eq!(BumpType::Same.to_string(), "same");
}
