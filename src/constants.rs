use std::time::Duration;

// git
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", "node_modules", ".DS_Store", ".history"];

// watcher
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

// commit message
pub const MESSAGE_PREFIX: &str = "Auto commit";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ui
pub const MAX_FILES_TO_SHOW: usize = 10;
pub const MAX_SUMMARY_LENGTH: usize = 50;

// listing server
pub const DEFAULT_PORT: u16 = 3000;
pub const FILES_API_ROUTE: &str = "/api/files";
