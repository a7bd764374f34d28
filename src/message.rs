use crate::category::Category;
use crate::changeset::RepositoryState;
use crate::constants::{MESSAGE_PREFIX, TIMESTAMP_FORMAT};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Write;

// order summary lines appear in
const SUMMARY_ORDER: [Category; 5] = [
    Category::Html,
    Category::Js,
    Category::Css,
    Category::Json,
    Category::Markdown,
];

/// build a commit message for the current time
pub fn generate(state: &RepositoryState, classify: bool) -> String {
    generate_at(state, &Local::now(), classify)
}

/// build a commit message: timestamp, optional per-file-type summary, then every changed path
pub fn generate_at<Tz>(state: &RepositoryState, now: &DateTime<Tz>, classify: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let files = state.changed_files();
    let mut message = format!("{MESSAGE_PREFIX}: {}\n", now.format(TIMESTAMP_FORMAT));

    if classify {
        let summary = summarise(&files);
        if !summary.is_empty() {
            message.push('\n');
            for line in summary {
                let _ = writeln!(message, "{line}");
            }
        }
    }

    if !files.is_empty() {
        message.push_str("\nchanged files:\n");
        for file in &files {
            let _ = writeln!(message, "- {file}");
        }
    }

    message.trim_end().to_string()
}

/// one line per known category present, with the number of matching files
fn summarise(files: &[&str]) -> Vec<String> {
    SUMMARY_ORDER
        .iter()
        .filter_map(|category| {
            let count = files
                .iter()
                .filter(|file| Category::from_path(file) == *category)
                .count();
            let text = category.commit_summary()?;
            (count > 0).then(|| format!("{text} ({count})"))
        })
        .collect()
}
