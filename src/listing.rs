use crate::category::Category;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// one child of a listed directory
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub icon: &'static str,
    pub is_directory: bool,
    /// human readable, files only
    pub size: Option<String>,
    pub size_bytes: Option<u64>,
    #[serde(rename = "modified", serialize_with = "serialize_iso8601")]
    pub modified_at: DateTime<Utc>,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("missing path parameter")]
    MissingPath,
    #[error("access to this path is not permitted")]
    Forbidden,
    #[error("path does not exist")]
    NotFound,
    #[error("failed to read directory: {0}")]
    Io(#[from] io::Error),
}

/// format a byte count with base-1024 units, one decimal place above bytes
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut unit = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024;
        unit += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let value = bytes as f64 / 1024_f64.powi(unit as i32);
    // ties round up, and 1023.95 KB and above becomes 1.0 MB
    let mut rounded = (value * 10.0).round() / 10.0;
    if rounded >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        rounded /= 1024.0;
        unit += 1;
    }
    format!("{rounded:.1} {}", SIZE_UNITS[unit])
}

/// resolve `requested` (relative paths start at `root`) and confine it to `root`
///
/// `root` must already be canonical. the lexical check happens before the
/// filesystem is touched; the canonical check catches symlinks pointing out
pub fn resolve_within_root(root: &Path, requested: &str) -> Result<PathBuf, ListingError> {
    if requested.is_empty() {
        return Err(ListingError::MissingPath);
    }

    let joined = root.join(requested); // an absolute `requested` replaces root
    let normalized = normalize_lexically(&joined);
    if !normalized.starts_with(root) {
        return Err(ListingError::Forbidden);
    }

    let canonical = match normalized.canonicalize() {
        Ok(path) => path,
        // a file used as a directory ("page.html/child") doesn't exist either
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            return Err(ListingError::NotFound);
        }
        Err(e) => return Err(e.into()),
    };
    if !canonical.starts_with(root) {
        return Err(ListingError::Forbidden);
    }

    Ok(canonical)
}

/// collapse `.` and `..` without consulting the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop(); // popping past the root leaves the root
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// list the direct children of `dir`: directories first, then files, each by name
pub fn read_directory(dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
    let mut entries = Vec::new();

    for dirent in fs::read_dir(dir)? {
        let dirent = dirent?;
        let path = dirent.path();
        // follow symlinks, but still list a dangling link as itself
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(_) => fs::symlink_metadata(&path)?,
        };

        let name = dirent.file_name().to_string_lossy().to_string();
        let is_directory = metadata.is_dir();
        let category = if is_directory {
            Category::Folder
        } else {
            Category::from_path(&name)
        };
        let size_bytes = (!is_directory).then(|| metadata.len());
        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();

        entries.push(DirectoryEntry {
            name,
            category,
            icon: category.icon(),
            is_directory,
            size: size_bytes.map(format_file_size),
            size_bytes,
            modified_at,
            path,
        });
    }

    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| compare_names(&a.name, &b.name))
    });
    Ok(entries)
}

/// validate `requested` against `root` and list it
pub fn list(root: &Path, requested: Option<&str>) -> Result<Vec<DirectoryEntry>, ListingError> {
    let dir = resolve_within_root(root, requested.unwrap_or_default())?;
    Ok(read_directory(&dir)?)
}

/// locale-style name ordering: case-insensitive, lowercase first on ties
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn serialize_iso8601<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}
