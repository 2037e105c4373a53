use std::{fs::OpenOptions, io::Write, path::Path};

use log::info;

use crate::libs::error::Result;

/// Publishes step outputs, appending to `$GITHUB_OUTPUT` when running inside an action.
pub fn set_outputs(outputs: &[(&str, String)]) -> Result<()>
{
    match std::env::var_os("GITHUB_OUTPUT")
    {
        Some(path) => write_outputs(Path::new(&path), outputs),
        None =>
        {
            for (name, value) in outputs
            {
                info!("Output: {}={}", name, value);
            }
            Ok(())
        },
    }
}

pub fn write_outputs(path: &Path, outputs: &[(&str, String)]) -> Result<()>
{
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for (name, value) in outputs
    {
        // Multi-line values need the heredoc form.
        if value.contains('\n')
        {
            writeln!(file, "{}<<__CHANGELOG_ACTION_EOF__\n{}\n__CHANGELOG_ACTION_EOF__", name, value)?;
        }
        else
        {
            writeln!(file, "{}={}", name, value)?;
        }
        info!("Output: {}={}", name, value);
    }
    Ok(())
}

#[test]
fn test_write_outputs_appends()
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output");
    std::fs::write(&path, "previous=1\n").unwrap();

    write_outputs(&path, &[("should_commit", "true".to_string()), ("npm_or_yarn", "yarn".to_string())]).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous=1\nshould_commit=true\nnpm_or_yarn=yarn\n");
}

#[test]
fn test_write_outputs_multiline()
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output");

    write_outputs(&path, &[("body", "- a  \n- b  ".to_string())]).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "body<<__CHANGELOG_ACTION_EOF__\n- a  \n- b  \n__CHANGELOG_ACTION_EOF__\n"
    );
}
