use std::{fs, path::{Path, PathBuf}};

use log::{debug, info};

use crate::libs::{data::ChangelogDataAuthor, error::{ChangelogError, Result}};

/// Local checkout the changelog is written to, committed from and pushed from.
pub struct Workspace
{
    repository: git2::Repository,
    workdir: PathBuf,
}

impl Workspace
{
    pub fn open(path: &Path) -> Result<Workspace>
    {
        let repository = git2::Repository::discover(path)?;
        if repository.is_bare()
        {
            return Err(ChangelogError::config("Repository is bare!"));
        }

        let workdir = repository
            .workdir()
            .ok_or_else(|| ChangelogError::config("Repository has no working directory"))?
            .to_path_buf();

        Ok(Workspace { repository, workdir })
    }

    /// Switches to `branch`, creating it from `<remote>/<branch>` when only the remote has it.
    pub fn checkout(&self, remote: &str, branch: &str) -> Result<()>
    {
        let local = match self.repository.find_branch(branch, git2::BranchType::Local)
        {
            Ok(local) => local,
            Err(error) if error.code() == git2::ErrorCode::NotFound =>
            {
                let upstream = format!("{}/{}", remote, branch);
                let commit = self.repository
                    .find_branch(&upstream, git2::BranchType::Remote)?
                    .get()
                    .peel_to_commit()?;

                let mut local = self.repository.branch(branch, &commit, false)?;
                local.set_upstream(Some(&upstream))?;
                debug!("Created {} tracking {}", branch, upstream);
                local
            },
            Err(error) => return Err(error.into()),
        };

        let reference = local
            .get()
            .name()
            .ok_or_else(|| ChangelogError::config(format!("Branch `{}` is not valid UTF-8", branch)))?
            .to_string();

        self.repository.set_head(&reference)?;
        self.repository.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))?;
        info!("Checked out: {}", reference);
        Ok(())
    }

    /// Current content of `file`, empty when it does not exist yet.
    pub fn read(&self, file: &str) -> Result<String>
    {
        let path = self.workdir.join(file);
        if !path.exists()
        {
            return Ok(String::new());
        }
        Ok(fs::read_to_string(path)?)
    }

    pub fn write(&self, file: &str, content: &str) -> Result<()>
    {
        fs::write(self.workdir.join(file), content)?;
        Ok(())
    }

    /// Stages everything and commits it on top of `HEAD`.
    pub fn commit(&self, author: &ChangelogDataAuthor, message: &str) -> Result<git2::Oid>
    {
        let mut index = self.repository.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.write()?;

        let tree = self.repository.find_tree(index.write_tree()?)?;
        let signature = git2::Signature::now(&author.name, &author.email)?;
        let parent = self.repository.head()?.peel_to_commit()?;

        let oid = self.repository.commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;
        info!("Committed: {} - {}", oid, message);
        Ok(oid)
    }

    pub fn push(&self, remote: &str, branch: &str, token: Option<&str>) -> Result<()>
    {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.push_update_reference(push_status);
        if let Some(token) = token
        {
            callbacks.credentials(move |_url, _username, _allowed| git2::Cred::userpass_plaintext("x-access-token", token));
        }

        let mut options = git2::PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        self.repository.find_remote(remote)?.push(&[refspec.as_str()], Some(&mut options))?;
        info!("Pushed: {} to {}", branch, remote);
        Ok(())
    }
}

/// Per ref result of a push, a hosted rejection (protected branch, hook) only shows up here.
fn push_status(refname: &str, status: Option<&str>) -> std::result::Result<(), git2::Error>
{
    match status
    {
        Some(message) => Err(git2::Error::from_str(&format!("{} rejected: {}", refname, message))),
        None => Ok(()),
    }
}

// Repository with a single commit on its default branch plus a `release` branch.
#[cfg(test)]
fn init_repository(dir: &Path) -> git2::Repository
{
    let repository = git2::Repository::init(dir).unwrap();
    fs::write(dir.join("README.md"), "readme\n").unwrap();

    let oid = {
        let mut index = repository.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree = repository.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = git2::Signature::now("tester", "tester@example.com").unwrap();
        repository.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[]).unwrap()
    };

    {
        let commit = repository.find_commit(oid).unwrap();
        repository.branch("release", &commit, false).unwrap();
    }
    repository
}

#[test]
fn test_checkout_read_write_commit()
{
    let dir = tempfile::tempdir().unwrap();
    let repository = init_repository(dir.path());

    let workspace = Workspace::open(dir.path()).unwrap();
    workspace.checkout("origin", "release").unwrap();
    assert_eq!(repository.head().unwrap().shorthand(), Some("release"));

    assert_eq!(workspace.read("CHANGELOG.md").unwrap(), "");
    workspace.write("CHANGELOG.md", "### **0.0.1** (2024-01-01)  \n").unwrap();
    assert_eq!(workspace.read("CHANGELOG.md").unwrap(), "### **0.0.1** (2024-01-01)  \n");

    let oid = workspace.commit(&ChangelogDataAuthor::default(), "Update changelog v0.0.1").unwrap();
    let commit = repository.find_commit(oid).unwrap();
    assert_eq!(commit.message(), Some("Update changelog v0.0.1"));
    assert_eq!(commit.author().email(), Some("actions@github.com"));
    assert!(commit.tree().unwrap().get_name("CHANGELOG.md").is_some());
    assert_eq!(repository.head().unwrap().peel_to_commit().unwrap().id(), oid);
}

#[test]
fn test_checkout_unknown_branch()
{
    let dir = tempfile::tempdir().unwrap();
    init_repository(dir.path());

    let workspace = Workspace::open(dir.path()).unwrap();
    assert!(matches!(workspace.checkout("origin", "nope"), Err(ChangelogError::Git(_))));
}

#[test]
fn test_push_to_local_remote()
{
    let dir = tempfile::tempdir().unwrap();
    let remote_dir = tempfile::tempdir().unwrap();
    let repository = init_repository(dir.path());
    let remote = git2::Repository::init_bare(remote_dir.path()).unwrap();
    repository.remote("origin", remote_dir.path().to_str().unwrap()).unwrap();

    let workspace = Workspace::open(dir.path()).unwrap();
    workspace.checkout("origin", "release").unwrap();
    workspace.write("CHANGELOG.md", "# **1.0.0** (2024-01-01)  \n").unwrap();
    let oid = workspace.commit(&ChangelogDataAuthor::default(), "Update changelog v1.0.0").unwrap();
    workspace.push("origin", "release", None).unwrap();

    let pushed = remote.find_branch("release", git2::BranchType::Local).unwrap();
    assert_eq!(pushed.get().target(), Some(oid));
}

#[test]
fn test_push_rejected_by_remote()
{
    let dir = tempfile::tempdir().unwrap();
    let remote_dir = tempfile::tempdir().unwrap();
    let repository = init_repository(dir.path());
    repository.remote("origin", remote_dir.path().to_str().unwrap()).unwrap();

    // The remote already moved on, a plain push is not a fast forward.
    let remote = git2::Repository::init_bare(remote_dir.path()).unwrap();
    {
        let signature = git2::Signature::now("tester", "tester@example.com").unwrap();
        let tree = remote.find_tree(remote.treebuilder(None).unwrap().write().unwrap()).unwrap();
        remote.commit(Some("refs/heads/release"), &signature, &signature, "Diverged", &tree, &[]).unwrap();
    }
    let diverged = remote.refname_to_id("refs/heads/release").unwrap();

    let workspace = Workspace::open(dir.path()).unwrap();
    workspace.checkout("origin", "release").unwrap();
    workspace.write("CHANGELOG.md", "# **1.0.0** (2024-01-01)  \n").unwrap();
    workspace.commit(&ChangelogDataAuthor::default(), "Update changelog v1.0.0").unwrap();

    assert!(matches!(workspace.push("origin", "release", None), Err(ChangelogError::Git(_))));
    assert_eq!(remote.refname_to_id("refs/heads/release").unwrap(), diverged);
}

#[test]
fn test_push_status()
{
    assert!(push_status("refs/heads/release", None).is_ok());

    let error = push_status("refs/heads/release", Some("protected branch hook declined")).unwrap_err();
    assert_eq!(error.message(), "refs/heads/release rejected: protected branch hook declined");
}
