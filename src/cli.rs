use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// git-autopush: commit and push working tree changes on a timer, and serve directory listings
#[derive(Parser, Debug)]
#[command(
    name = "git-autopush",
    about,
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// repository to watch (defaults to the current directory)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// remote to push to
    #[arg(long, global = true)]
    pub remote: Option<String>,

    /// remote branch to push to
    #[arg(long, global = true)]
    pub branch: Option<String>,

    /// seconds between checks
    #[arg(long, global = true, value_name = "SECS")]
    pub interval: Option<u64>,

    /// commit without pushing
    #[arg(long, global = true)]
    pub no_push: bool,

    /// skip the per-file-type summary in generated messages
    #[arg(long, global = true)]
    pub no_classify: bool,

    /// extra file or directory name to leave out of commits (repeatable)
    #[arg(long, global = true, value_name = "NAME")]
    pub exclude: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// start watching and committing changes
    Start,

    /// stop watching (only affects a watcher started in this process)
    Stop,

    /// run a single commit cycle now
    Commit {
        /// use this message instead of a generated one
        message: Option<String>,
    },

    /// show watcher and repository state
    Status,

    /// serve the directory listing api and static files
    Serve {
        /// port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// directory that listings are confined to
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn print_usage() {
        let _ = Self::command().print_help();
    }
}
