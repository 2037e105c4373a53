use chrono::NaiveDate;

use super::bump::ReleaseBump;

/// One new section of the changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry
{
    pub version: String,
    pub date: NaiveDate,
    pub bump: ReleaseBump,
    pub body: String,
}

impl ChangelogEntry
{
    // `# **1.2.0** (2024-05-30)`
    pub fn heading(&self) -> String
    {
        format!("{} **{}** ({})", self.bump.heading_marker(), self.version, self.date.format("%Y-%m-%d"))
    }
}

/// Puts `entry` on top of the existing changelog.
///
/// The previous content is kept byte for byte. Nothing is deduplicated, running
/// twice for one version yields two sections.
pub fn prepend(entry: &ChangelogEntry, existing: &str) -> String
{
    // Two trailing spaces force a markdown line break.
    format!("{}  \n  \n{}  \n  \n{}", entry.heading(), entry.body, existing)
}

#[cfg(test)]
fn entry(bump: ReleaseBump, version: &str, body: &str) -> ChangelogEntry
{
    ChangelogEntry {
        version: version.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        bump,
        body: body.to_string(),
    }
}

#[test]
fn test_prepend_layout()
{
    let document = prepend(&entry(ReleaseBump::Minor, "1.3.0", "- Add feature  "), "## **1.2.0** (2024-01-01)  \n");
    assert_eq!(
        document,
        "## **1.3.0** (2024-03-07)  \n  \n- Add feature    \n  \n## **1.2.0** (2024-01-01)  \n"
    );
}

#[test]
fn test_prepend_heading_follows_bump()
{
    let cases = [(ReleaseBump::Major, "# "), (ReleaseBump::Minor, "## "), (ReleaseBump::Patch, "### ")];
    for (bump, marker) in cases
    {
        let document = prepend(&entry(bump, "2.0.0", ""), "");
        assert!(document.starts_with(&format!("{}**2.0.0** (2024-03-07)", marker)), "{:?}: {}", bump, document);
    }
}

#[test]
fn test_prepend_keeps_existing_document_as_suffix()
{
    let existing = "# **1.0.0** (2023-01-01)  \r\n  \n\u{1F680} weird *bytes*\n\n\n";
    let document = prepend(&entry(ReleaseBump::Patch, "1.0.1", "- fix  "), existing);
    assert!(document.ends_with(existing));
    assert_eq!(document.len(), prepend(&entry(ReleaseBump::Patch, "1.0.1", "- fix  "), "").len() + existing.len());
}

#[test]
fn test_prepend_empty_body_and_document()
{
    assert_eq!(prepend(&entry(ReleaseBump::Major, "3.0.0", ""), ""), "# **3.0.0** (2024-03-07)  \n  \n  \n  \n");
}

#[test]
fn test_prepend_twice_duplicates()
{
    let e = entry(ReleaseBump::Patch, "1.0.1", "- fix  ");
    let once = prepend(&e, "");
    let twice = prepend(&e, &once);
    assert_eq!(twice.matches("### **1.0.1**").count(), 2);
}
