use crate::changeset::{CommitOutcome, RepositoryState, short_hash};
use crate::config::WatchConfig;
use crate::constants::MAX_FILES_TO_SHOW;
use crate::{error, git, info, message, status};
use anyhow::{Context, Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

/// stages, commits and pushes the working tree described by a `WatchConfig`
#[derive(Debug, Clone)]
pub struct Committer {
    config: WatchConfig,
}

impl Committer {
    pub fn new(config: WatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// query the working tree; any failure is logged and reported as "no changes"
    pub fn check_for_changes(&self) -> RepositoryState {
        match git::read_state(&self.config.repo_path, |path| {
            self.config.is_excluded(path)
        }) {
            Ok(state) => state,
            Err(e) => {
                error!("failed to check repository status: {:#}", e);
                RepositoryState::default()
            }
        }
    }

    /// stage everything, commit with `message`, then push when enabled
    ///
    /// a failing step aborts the rest and nothing is rolled back, so a failed
    /// push leaves the new commit in place locally
    pub fn commit_and_push(&self, message: &str) -> Result<CommitOutcome> {
        let path = &self.config.repo_path;
        let repo = git::open(path)?;
        git::sanity_check(&repo)?;

        // HEAD is pushed to the configured branch, whatever branch it is on
        if self.config.auto_push {
            let current = git::current_branch(&repo);
            if current != self.config.branch {
                bail!(
                    "HEAD is on '{}' but pushes go to {}/{}; pass --branch {} or --no-push",
                    current,
                    self.config.remote,
                    self.config.branch,
                    current
                );
            }
        }

        git::stage_all(&repo, |p| self.config.is_excluded(p))?;
        git::commit(path, message)?;

        let commit_hash = git::last_commit(path)?
            .map(|c| c.hash)
            .context("HEAD has no commit after committing")?;

        if !self.config.auto_push {
            return Ok(CommitOutcome {
                commit_hash,
                pushed: false,
            });
        }

        let spinner = push_spinner(&self.config.remote, &self.config.branch);
        let pushed = git::push(path, &self.config.remote, &self.config.branch);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        pushed.map_err(|e| {
            anyhow!(
                "commit {} was created but not pushed: {:#}",
                short_hash(&commit_hash),
                e
            )
        })?;

        Ok(CommitOutcome {
            commit_hash,
            pushed: true,
        })
    }

    /// one check-and-commit pass; returns None when there was nothing to commit
    pub fn run_cycle(&self, custom_message: Option<&str>) -> Result<Option<CommitOutcome>> {
        let state = self.check_for_changes();
        if !state.has_changes {
            status!("no changes to commit");
            return Ok(None);
        }

        display_changes(&state);

        let message = match custom_message {
            Some(message) => message.to_string(),
            None => message::generate(&state, self.config.classify),
        };
        status!("commit message:");
        for line in message.lines() {
            info!("  {}", line);
        }

        let outcome = self.commit_and_push(&message)?;
        if outcome.pushed {
            status!(
                "committed {} and pushed to {}/{}",
                outcome.short_hash(),
                self.config.remote,
                self.config.branch
            );
        } else {
            status!("committed {}", outcome.short_hash());
        }
        Ok(Some(outcome))
    }
}

/// spinner shown while pushing, only when attached to a terminal
fn push_spinner(remote: &str, branch: &str) -> Option<ProgressBar> {
    if !std::io::stdout().is_terminal() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("pushing to {remote}/{branch}..."));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(spinner)
}

fn display_changes(state: &RepositoryState) {
    let files = state.changed_files();
    let file_word = if files.len() == 1 { "file" } else { "files" };
    let base = state
        .last_commit_hash
        .as_deref()
        .map_or_else(|| "no commits yet".to_string(), |hash| short_hash(hash).to_string());
    status!(
        "found {} changed {} on {} ({}):",
        files.len(),
        file_word,
        state.current_branch,
        base
    );

    for file in files.iter().take(MAX_FILES_TO_SHOW) {
        info!("  {}", file);
    }

    // show count of remaining files if there are more than MAX_FILES_TO_SHOW
    if files.len() > MAX_FILES_TO_SHOW {
        info!("  (+{} more)", files.len() - MAX_FILES_TO_SHOW);
    }
}
