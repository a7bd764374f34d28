use crate::changeset::RepositoryState;
use anyhow::{Context, Result, bail};
use git2::{ErrorCode, IndexAddOption, Repository, Status, StatusOptions};
use std::path::Path;
use std::process::Command;

/// hash and summary line of a commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub hash: String,
    pub summary: String,
}

/// open the repository containing `path` (can be anywhere within the work tree)
pub fn open(path: &Path) -> Result<Repository> {
    Repository::discover(path)
        .with_context(|| format!("not in a git repository: {}", path.display()))
}

/// check the repository is in a state where an automatic commit is safe
pub fn sanity_check(repo: &Repository) -> Result<()> {
    // check we're not in the middle of a git operation
    if repo.state() != git2::RepositoryState::Clean {
        bail!("repository is in the middle of an operation (merge, rebase, etc)");
    }

    // check we're not on a detached HEAD
    if repo.head_detached().unwrap_or(false) {
        bail!("repository is in detached HEAD state");
    }

    Ok(())
}

/// read working tree status, splitting paths into staged and unstaged (untracked included)
pub fn read_state(path: &Path, is_excluded: impl Fn(&str) -> bool) -> Result<RepositoryState> {
    let repo = open(path)?;

    let mut opts = StatusOptions::new();
    opts.include_untracked(true);
    opts.recurse_untracked_dirs(true);
    opts.include_ignored(false);
    let statuses = repo
        .statuses(Some(&mut opts))
        .context("failed to read repository status")?;

    let staged_mask = Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE;
    let unstaged_mask = Status::WT_NEW
        | Status::WT_MODIFIED
        | Status::WT_DELETED
        | Status::WT_RENAMED
        | Status::WT_TYPECHANGE
        | Status::CONFLICTED;

    let mut state = RepositoryState::default();
    for entry in statuses.iter() {
        let Some(path) = entry.path() else {
            continue; // non utf-8 path
        };
        if is_excluded(path) {
            continue;
        }
        let status = entry.status();
        if status.intersects(staged_mask) {
            state.staged_files.push(path.to_string());
        }
        if status.intersects(unstaged_mask) {
            state.unstaged_files.push(path.to_string());
        }
    }

    state.has_changes = !state.staged_files.is_empty() || !state.unstaged_files.is_empty();
    state.current_branch = current_branch(&repo);
    state.last_commit_hash = head_commit(&repo).map(|c| c.hash);
    Ok(state)
}

/// name of the checked out branch, falling back to "HEAD" when detached
pub fn current_branch(repo: &Repository) -> String {
    match repo.head() {
        Ok(head) if head.is_branch() => head.shorthand().unwrap_or("HEAD").to_string(),
        Ok(_) => "HEAD".to_string(),
        // unborn branch: HEAD still names the branch it will create
        Err(_) => repo
            .find_reference("HEAD")
            .ok()
            .and_then(|head| {
                head.symbolic_target()
                    .map(|target| target.trim_start_matches("refs/heads/").to_string())
            })
            .unwrap_or_else(|| "HEAD".to_string()),
    }
}

fn head_commit(repo: &Repository) -> Option<CommitInfo> {
    let commit = repo.head().ok()?.peel_to_commit().ok()?;
    Some(CommitInfo {
        hash: commit.id().to_string(),
        summary: commit.summary().unwrap_or_default().to_string(),
    })
}

/// the commit HEAD points at, or None for an unborn branch
pub fn last_commit(path: &Path) -> Result<Option<CommitInfo>> {
    let repo = open(path)?;
    Ok(head_commit(&repo))
}

/// stage every working tree change (additions, modifications and deletions)
pub fn stage_all(repo: &Repository, is_excluded: impl Fn(&str) -> bool) -> Result<()> {
    let mut index = repo.index().context("failed to get git index")?;

    // returning non-zero from the callback skips the path
    let skip_excluded: &mut git2::IndexMatchedPath =
        &mut |path: &Path, _matched_spec: &[u8]| i32::from(is_excluded(&path.to_string_lossy()));

    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, Some(&mut *skip_excluded))
        .context("failed to stage changes")?;
    // add_all never removes entries, update_all picks up deleted files
    index
        .update_all(["*"].iter(), Some(&mut *skip_excluded))
        .context("failed to stage deletions")?;

    // write the index to disk
    index.write().context("failed to write git index")?;
    Ok(())
}

/// create a commit with the given message
///
/// uses the git binary rather than git2 to ensure commit signing (gpg/ssh)
/// and git hooks (pre-commit, commit-msg, etc.) work as expected. the message
/// is passed as its own argument, so it is never interpreted by a shell
pub fn commit(path: &Path, message: &str) -> Result<()> {
    let status = Command::new("git")
        .arg("commit")
        .arg("--message")
        .arg(message)
        .current_dir(path)
        .status()
        .context("failed to run git commit")?;

    if !status.success() {
        bail!("git commit failed with {}", status);
    }
    Ok(())
}

/// push HEAD to `branch` on `remote`
pub fn push(path: &Path, remote: &str, branch: &str) -> Result<()> {
    let refspec = format!("HEAD:refs/heads/{branch}");
    let output = Command::new("git")
        .arg("push")
        .arg("--quiet")
        .arg(remote)
        .arg(&refspec)
        .current_dir(path)
        .output()
        .context("failed to run git push")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git push {} {} failed with {}: {}",
            remote,
            refspec,
            output.status,
            stderr.trim()
        );
    }
    Ok(())
}

/// commits HEAD is ahead of and behind the remote tracking branch, or None if it isn't known
pub fn ahead_behind(path: &Path, remote: &str, branch: &str) -> Result<Option<(usize, usize)>> {
    let repo = open(path)?;

    let Some(local) = repo.head().ok().and_then(|head| head.target()) else {
        return Ok(None);
    };

    let tracking = format!("refs/remotes/{remote}/{branch}");
    let upstream = match repo.refname_to_id(&tracking) {
        Ok(oid) => oid,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("failed to resolve {tracking}")),
    };

    let counts = repo
        .graph_ahead_behind(local, upstream)
        .with_context(|| format!("failed to compare HEAD with {tracking}"))?;
    Ok(Some(counts))
}
