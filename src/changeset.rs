use std::collections::HashSet;

/// snapshot of the working tree, recomputed on every check
#[derive(Debug, Default, Clone)]
pub struct RepositoryState {
    pub has_changes: bool,
    pub unstaged_files: Vec<String>, // includes untracked files
    pub staged_files: Vec<String>,
    pub current_branch: String,
    pub last_commit_hash: Option<String>,
}

impl RepositoryState {
    /// staged then unstaged paths, each listed once
    pub fn changed_files(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.staged_files
            .iter()
            .chain(&self.unstaged_files)
            .map(String::as_str)
            .filter(|path| seen.insert(*path))
            .collect()
    }
}

/// result of a successful commit (and optional push)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub commit_hash: String,
    pub pushed: bool,
}

impl CommitOutcome {
    pub fn short_hash(&self) -> &str {
        short_hash(&self.commit_hash)
    }
}

pub fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}
