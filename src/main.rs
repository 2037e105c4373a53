#![cfg_attr(feature = "strict", deny(warnings))]

use std::path::Path;

use clap::Parser;
use log::{debug, error, info};

use feature::{
    commit::Workspace,
    github::GitHubSource,
    outputs::set_outputs,
    package_manager,
    update::{self, Outcome, UpdateParams},
};
use libs::{data::ChangelogData, error::Result, tag::strip_branch_ref};

mod feature;
mod libs;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Settings file, defaults are used when it does not exist.
    #[arg(short, long, default_value = ".changelog.json")]
    json_input: String,

    /// Local checkout the changelog is committed from.
    #[arg(short, long, default_value = ".")]
    repository: String,
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    #[arg(long, env = "INPUT_OWNER")]
    owner: String,

    #[arg(long, env = "INPUT_REPO")]
    repo: String,

    /// `github.head_ref || github.ref`, a leading `refs/heads/` is stripped.
    #[arg(long, env = "INPUT_BRANCH")]
    branch: String,

    /// Falls back to `GITHUB_TOKEN`.
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
}

impl TargetArgs
{
    fn token(&self) -> Option<String>
    {
        self.github_token
            .clone()
            .filter(|token| !token.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Prepends a section to the changelog when the branch carries a new release.
    UpdateChangelog {
        #[command(flatten)]
        target: TargetArgs,

        /// JSON array of author names whose commits are left out.
        #[arg(long, env = "INPUT_EXCLUDE_COMMIT_FROM_AUTHOR_NAMES_JSON")]
        exclude_commit_from_author_names_json: Option<String>,

        /// Render the changelog without writing, committing or pushing, `should_commit` is reported as false.
        #[arg(long, action)]
        dry_run: bool,
    },
    /// Tells whether the branch uses npm or yarn.
    PackageManager {
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[tokio::main]
async fn main() {
    // Initialize the logger, while in debug mode, log everything; otherwise, log only errors, warnings and info.
    if cfg!(debug_assertions)
    {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::max())
            .parse_default_env()
            .init();
    }
    else
    {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .init();
    }

    // Parse the command line arguments
    let args = Args::parse();

    if let Err(error) = run(args).await
    {
        error!("{}", error);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()>
{
    match args.command
    {
        Command::UpdateChangelog { ref target, ref exclude_commit_from_author_names_json, dry_run } =>
        {
            update_changelog(&args, target, exclude_commit_from_author_names_json.as_deref(), dry_run).await
        },
        Command::PackageManager { ref target } =>
        {
            let branch = strip_branch_ref(&target.branch);
            let source = GitHubSource::new(target.token(), &target.owner, &target.repo)?;

            let package_manager = package_manager::detect(&source, branch).await?;
            info!("{}/{}#{} is using {}", target.owner, target.repo, branch, package_manager);

            set_outputs(&[("npm_or_yarn", package_manager.to_string())])
        },
    }
}

// Nothing was committed on a dry run, later steps must not act on it.
fn should_commit(outcome: &Outcome, dry_run: bool) -> bool
{
    outcome.should_commit() && !dry_run
}

async fn update_changelog(args: &Args, target: &TargetArgs, exclude_json: Option<&str>, dry_run: bool) -> Result<()>
{
    let data = ChangelogData::load(Path::new(&args.json_input))?;
    info!("Read Changelog Settings");

    let params = UpdateParams {
        owner: target.owner.clone(),
        repo: target.repo.clone(),
        branch: strip_branch_ref(&target.branch).to_string(),
        excluded_authors: data.excluded_authors(exclude_json)?,
        version_file: data.version_file.clone(),
    };
    debug!("Params: {:?}", params);

    let token = target.token();
    let source = GitHubSource::new(token.clone(), &params.owner, &params.repo)?;

    let outcome = update::plan(&source, &params).await?;
    let update = match &outcome
    {
        Outcome::Update(update) => update,
        Outcome::Skipped(_) => return set_outputs(&[("should_commit", outcome.should_commit().to_string())]),
    };

    let workspace = Workspace::open(Path::new(&args.repository))?;
    if !dry_run
    {
        workspace.checkout(&data.remote, &update.branch)?;
    }

    let existing = workspace.read(&data.changelog_file)?;
    let changelog = update.render(chrono::Local::now().date_naive(), &existing);
    debug!("{}: {}", data.changelog_file, changelog);

    if dry_run
    {
        info!("Dry Run: not writing {}, would commit `{}`", data.changelog_file, update.commit_message);
    }
    else
    {
        workspace.write(&data.changelog_file, &changelog)?;
        workspace.commit(&data.commit_author, &update.commit_message)?;
        workspace.push(&data.remote, &update.branch, token.as_deref())?;
    }

    set_outputs(&[
        ("should_commit", should_commit(&outcome, dry_run).to_string()),
        ("commit_message", update.commit_message.clone()),
        ("version", update.version.clone()),
    ])
}

#[test]
fn test_args_parse()
{
    let args = Args::try_parse_from([
        "changelog-action",
        "update-changelog",
        "--owner", "acme",
        "--repo", "widgets",
        "--branch", "refs/heads/main",
        "--exclude-commit-from-author-names-json", r#"["bot"]"#,
        "--dry-run",
    ]).unwrap();

    assert_eq!(args.json_input, ".changelog.json");
    match args.command
    {
        Command::UpdateChangelog { target, exclude_commit_from_author_names_json, dry_run } =>
        {
            assert_eq!(target.owner, "acme");
            assert_eq!(strip_branch_ref(&target.branch), "main");
            assert_eq!(exclude_commit_from_author_names_json.as_deref(), Some(r#"["bot"]"#));
            assert!(dry_run);
        },
        other => panic!("Unexpected command: {:?}", other),
    }
}

#[test]
fn test_args_package_manager()
{
    let args = Args::try_parse_from([
        "changelog-action",
        "-r", "/tmp/checkout",
        "package-manager",
        "--owner", "acme",
        "--repo", "widgets",
        "--branch", "dev",
    ]).unwrap();

    assert_eq!(args.repository, "/tmp/checkout");
    assert!(matches!(args.command, Command::PackageManager { .. }));
}

#[test]
fn test_dry_run_never_commits()
{
    use feature::update::{PendingUpdate, SkipReason};
    use libs::bump::ReleaseBump;

    let update = Outcome::Update(PendingUpdate {
        branch: "main".to_string(),
        version: "1.3.0".to_string(),
        bump: ReleaseBump::Minor,
        commit_message: "Update changelog v1.3.0".to_string(),
        body: "- Add feature  ".to_string(),
    });

    assert!(should_commit(&update, false));
    assert!(!should_commit(&update, true));
    assert!(!should_commit(&Outcome::Skipped(SkipReason::FirstRelease), false));
}
