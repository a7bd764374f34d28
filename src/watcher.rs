use crate::changeset::{CommitOutcome, RepositoryState, short_hash};
use crate::committer::Committer;
use crate::constants::MAX_SUMMARY_LENGTH;
use crate::git::{self, CommitInfo};
use crate::ui::{field, yes_no};
use crate::{error, status, warning};
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// runs commit cycles on a fixed interval
///
/// all state lives on the instance, so independent watchers (one per test,
/// say) never interfere. `start` must be called from within a tokio runtime
pub struct Watcher {
    committer: Committer,
    last_commit_hash: Arc<Mutex<Option<String>>>,
    task: Option<JoinHandle<()>>,
}

/// snapshot printed by the `status` command
#[derive(Debug)]
pub struct StatusReport {
    pub running: bool,
    pub state: RepositoryState,
    pub last_commit_hash: Option<String>,
    pub last_commit: Option<CommitInfo>,
    /// commits ahead of / behind the remote tracking branch, when it exists
    pub ahead_behind: Option<(usize, usize)>,
}

impl Watcher {
    pub fn new(committer: Committer) -> Self {
        let last_commit_hash = git::last_commit(&committer.config().repo_path)
            .ok()
            .flatten()
            .map(|c| c.hash);
        Self {
            committer,
            last_commit_hash: Arc::new(Mutex::new(last_commit_hash)),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn last_commit_hash(&self) -> Option<String> {
        self.last_commit_hash
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// run a cycle now and then once per poll interval, until `stop`
    pub fn start(&mut self) {
        if self.is_running() {
            warning!("watcher is already running");
            return;
        }

        let config = self.committer.config();
        status!("starting watcher...");
        field("repository", config.repo_path.display());
        field("interval", format!("{}s", config.poll_interval.as_secs()));
        field("remote", format!("{}/{}", config.remote, config.branch));
        field("auto-push", yes_no(config.auto_push));

        let committer = self.committer.clone();
        let last_commit_hash = Arc::clone(&self.last_commit_hash);
        let period = config.poll_interval;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // the first tick completes immediately
                ticker.tick().await;
                if let Err(e) = run_cycle(committer.clone(), None, &last_commit_hash).await {
                    error!("commit cycle failed: {:#}", e);
                }
            }
        }));
    }

    /// cancel the pending timer; a git command already running is left to finish
    pub fn stop(&mut self) {
        match self.task.take() {
            Some(task) => {
                status!("stopping watcher...");
                task.abort();
            }
            None => warning!("watcher is not running"),
        }
    }

    /// one immediate cycle outside the schedule, optionally with a literal message
    ///
    /// nothing serialises this against a scheduled cycle of the same watcher,
    /// so overlapping the two can interleave git commands
    pub async fn commit_once(&self, message: Option<String>) -> Result<Option<CommitOutcome>> {
        run_cycle(self.committer.clone(), message, &self.last_commit_hash).await
    }

    pub fn status(&self) -> StatusReport {
        let config = self.committer.config();
        let last_commit = git::last_commit(&config.repo_path).ok().flatten();
        let ahead_behind = match git::ahead_behind(&config.repo_path, &config.remote, &config.branch)
        {
            Ok(counts) => counts,
            Err(e) => {
                warning!("could not compare with {}: {:#}", config.remote, e);
                None
            }
        };
        StatusReport {
            running: self.is_running(),
            state: self.committer.check_for_changes(),
            last_commit_hash: self.last_commit_hash(),
            last_commit,
            ahead_behind,
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl StatusReport {
    pub fn print(&self, remote: &str, branch: &str) {
        status!("current state:");
        field("running", yes_no(self.running));
        field("changes", yes_no(self.state.has_changes));
        field("staged", self.state.staged_files.len());
        field("unstaged", self.state.unstaged_files.len());
        if !self.state.current_branch.is_empty() {
            field("branch", &self.state.current_branch);
        }

        match (&self.last_commit, &self.last_commit_hash) {
            (Some(commit), _) => {
                let summary: String = commit.summary.chars().take(MAX_SUMMARY_LENGTH).collect();
                field(
                    "last commit",
                    format!("{} {}", short_hash(&commit.hash), summary),
                );
            }
            (None, Some(hash)) => field("last commit", short_hash(hash)),
            (None, None) => field("last commit", "none"),
        }

        match self.ahead_behind {
            Some((0, 0)) => field("remote", format!("up to date with {remote}/{branch}")),
            Some((ahead, behind)) => {
                field(
                    "remote",
                    format!("{ahead} ahead, {behind} behind {remote}/{branch}"),
                );
                if ahead > 0 {
                    warning!("{} commit(s) have not been pushed", ahead);
                }
            }
            None => field("remote", format!("{remote}/{branch} not tracked")),
        }
    }
}

/// run a cycle on the blocking pool and record whatever HEAD ends up at
async fn run_cycle(
    committer: Committer,
    message: Option<String>,
    last_commit_hash: &Mutex<Option<String>>,
) -> Result<Option<CommitOutcome>> {
    let (result, head) = tokio::task::spawn_blocking(move || {
        let result = committer.run_cycle(message.as_deref());
        // a failed push still leaves a new commit behind, so re-read HEAD either way
        let head = git::last_commit(&committer.config().repo_path)
            .ok()
            .flatten()
            .map(|c| c.hash);
        (result, head)
    })
    .await
    .context("commit cycle panicked")?;

    if head.is_some() {
        *last_commit_hash
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = head;
    }
    result
}
