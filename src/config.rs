use crate::cli::Cli;
use crate::constants::{
    DEFAULT_BRANCH, DEFAULT_EXCLUDES, DEFAULT_POLL_INTERVAL, DEFAULT_PORT, DEFAULT_REMOTE,
};
use std::path::PathBuf;
use std::time::Duration;

/// settings for the watcher and committer, fixed for the life of the process
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// repository working tree (any directory inside it works)
    pub repo_path: PathBuf,

    /// remote that commits are pushed to
    pub remote: String,

    /// remote branch that HEAD is pushed to
    pub branch: String,

    /// time between change checks
    pub poll_interval: Duration,

    /// whether to push after each commit
    pub auto_push: bool,

    /// whether generated messages carry a per-file-type summary
    pub classify: bool,

    /// file or directory names that are never staged
    pub exclude: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            auto_push: true,
            classify: true,
            exclude: DEFAULT_EXCLUDES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl WatchConfig {
    /// layer command line overrides over the defaults
    pub fn from_cli(cli: &Cli) -> Self {
        let mut config = Self::default();
        if let Some(repo) = &cli.repo {
            config.repo_path.clone_from(repo);
        }
        if let Some(remote) = &cli.remote {
            config.remote.clone_from(remote);
        }
        if let Some(branch) = &cli.branch {
            config.branch.clone_from(branch);
        }
        if let Some(secs) = cli.interval {
            // a zero period would make tokio's interval panic
            config.poll_interval = Duration::from_secs(secs.max(1));
        }
        config.auto_push = !cli.no_push;
        config.classify = !cli.no_classify;
        config.exclude.extend(cli.exclude.iter().cloned());
        config
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        path.split('/')
            .any(|component| self.exclude.iter().any(|name| name == component))
    }
}

/// settings for the directory listing server
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub port: u16,
    pub root: PathBuf,
}

impl ServeConfig {
    pub fn new(port: Option<u16>, root: Option<PathBuf>) -> Self {
        Self {
            port: port.unwrap_or(DEFAULT_PORT),
            root: root.unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_constants() {
        let config = WatchConfig::default();
        assert_eq!(config.remote, "origin");
        assert_eq!(config.branch, "main");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert!(config.auto_push);
        assert!(config.classify);
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cli = Cli::parse_from([
            "git-autopush",
            "start",
            "--remote",
            "upstream",
            "--branch",
            "trunk",
            "--interval",
            "5",
            "--no-push",
            "--exclude",
            "target",
        ]);
        let config = WatchConfig::from_cli(&cli);
        assert_eq!(config.remote, "upstream");
        assert_eq!(config.branch, "trunk");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert!(!config.auto_push);
        assert!(config.classify);
        assert!(config.exclude.iter().any(|name| name == "target"));
        assert!(config.exclude.iter().any(|name| name == "node_modules"));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let cli = Cli::parse_from(["git-autopush", "start", "--interval", "0"]);
        let config = WatchConfig::from_cli(&cli);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn exclusion_matches_whole_components() {
        let config = WatchConfig::default();
        assert!(config.is_excluded("node_modules/left-pad/index.js"));
        assert!(config.is_excluded("assets/.DS_Store"));
        assert!(!config.is_excluded("src/node_modules_notes.md"));
        assert!(!config.is_excluded("index.html"));
    }
}
