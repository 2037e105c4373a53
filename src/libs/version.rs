use std::{cmp::Ordering, fmt::Display, str::FromStr, sync::OnceLock};

use regex::Regex;

use super::error::{ChangelogError, Result};

// MAJOR.MINOR.PATCH[-rc.N]
fn version_regex() -> &'static Regex
{
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:-rc\.(\d+))?$").expect("version regex is valid"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemanticVersion
{
    pub major: u32,
    pub minor: u32,
    pub patch: u32,

    // Release candidate ordinal, a pre-release when set.
    pub rc: Option<u32>,
}

impl SemanticVersion
{
    // Ctor
    pub fn new(major: u32, minor: u32, patch: u32) -> SemanticVersion
    {
        SemanticVersion { major, minor, patch, rc: None }
    }

    pub fn is_release_candidate(&self) -> bool
    {
        self.rc.is_some()
    }

    // Parse
    pub fn parse(version: &str) -> Result<SemanticVersion>
    {
        let malformed = || ChangelogError::MalformedVersion(version.to_string());

        let captures = version_regex().captures(version).ok_or_else(malformed)?;

        // Every group is all digits, only overflow can fail here.
        let component = |index: usize| -> Result<Option<u32>>
        {
            captures
                .get(index)
                .map(|m| m.as_str().parse::<u32>().map_err(|_| malformed()))
                .transpose()
        };

        Ok(SemanticVersion {
            major: component(1)?.ok_or_else(malformed)?,
            minor: component(2)?.ok_or_else(malformed)?,
            patch: component(3)?.ok_or_else(malformed)?,
            rc: component(4)?,
        })
    }

    /// Compares only `major.minor.patch`, ignoring any release candidate.
    pub fn cmp_release(&self, other: &SemanticVersion) -> Ordering
    {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl FromStr for SemanticVersion
{
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self>
    {
        SemanticVersion::parse(s)
    }
}

impl Ord for SemanticVersion
{
    fn cmp(&self, other: &Self) -> Ordering
    {
        self.cmp_release(other).then_with(|| match (self.rc, other.rc)
        {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(&b),
        })
    }
}

impl PartialOrd for SemanticVersion
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        Some(self.cmp(other))
    }
}

impl Display for SemanticVersion
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        // x.x.x[-rc.N]
        if let Some(rc) = self.rc
        {
            write!(f, "-rc.{}", rc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
fn random_version() -> SemanticVersion
{
    use rand::Rng;

    let mut rng = rand::thread_rng();
    SemanticVersion {
        major: rng.gen_range(0..4),
        minor: rng.gen_range(0..4),
        patch: rng.gen_range(0..4),
        rc: if rng.gen_bool(0.3) { Some(rng.gen_range(0..3)) } else { None },
    }
}

#[cfg(test)]
fn rc(major: u32, minor: u32, patch: u32, rc: u32) -> SemanticVersion
{
    SemanticVersion { rc: Some(rc), ..SemanticVersion::new(major, minor, patch) }
}

#[test]
fn test_parse()
{
    assert_eq!(SemanticVersion::parse("1.2.3").unwrap(), SemanticVersion::new(1, 2, 3));
    assert_eq!(SemanticVersion::parse("1.4.0-rc.1").unwrap(), rc(1, 4, 0, 1));
    assert_eq!("0.0.0".parse::<SemanticVersion>().unwrap(), SemanticVersion::new(0, 0, 0));
}

#[test]
fn test_parse_malformed()
{
    for text in ["", "1.2", "1.2.3.4", "v1.2.3", "1.2.x", "1.2.3-beta.1", "1.2.3-rc", "1.2.3-rc.", " 1.2.3", "99999999999.0.0"]
    {
        let result = SemanticVersion::parse(text);
        assert!(matches!(result, Err(ChangelogError::MalformedVersion(_))), "Accepted `{}`: {:?}", text, result);
    }
}

#[test]
fn test_parse_is_left_inverse_of_format()
{
    for _ in 0..200
    {
        let version = random_version();
        assert_eq!(SemanticVersion::parse(&version.to_string()).unwrap(), version);
    }
    assert_eq!(rc(2, 0, 1, 7).to_string(), "2.0.1-rc.7");
}

#[test]
fn test_release_candidate_is_less_than_release()
{
    let release = SemanticVersion::new(1, 4, 0);
    assert!(rc(1, 4, 0, 9) < release);
    assert!(rc(1, 4, 0, 1) < rc(1, 4, 0, 2));
    assert!(rc(1, 4, 1, 0) > release);
    assert_ne!(rc(1, 4, 0, 0), release);
}

#[test]
fn test_total_order()
{
    let versions: Vec<SemanticVersion> = (0..40).map(|_| random_version()).collect();

    for a in versions.iter()
    {
        for b in versions.iter()
        {
            let relations = [a < b, a == b, a > b];
            assert_eq!(relations.iter().filter(|x| **x).count(), 1, "{} vs {}", a, b);

            for c in versions.iter()
            {
                if a < b && b < c
                {
                    assert!(a < c, "{} < {} < {}", a, b, c);
                }
            }
        }
    }
}
