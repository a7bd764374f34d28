use serde::Serialize;
use std::path::Path;

/// file type as derived from the extension; shared by directory listings and commit summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Folder,
    Html,
    Css,
    Js,
    Json,
    Markdown,
    Text,
    Image,
    Pdf,
    Archive,
    Generic,
}

impl Category {
    /// classify a file by its extension (case-insensitive)
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let Some(ext) = path.as_ref().extension() else {
            return Self::Generic;
        };
        match ext.to_string_lossy().to_lowercase().as_str() {
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "js" => Self::Js,
            "json" => Self::Json,
            "md" => Self::Markdown,
            "txt" => Self::Text,
            "png" | "jpg" | "jpeg" | "gif" | "svg" => Self::Image,
            "pdf" => Self::Pdf,
            "zip" | "rar" => Self::Archive,
            _ => Self::Generic,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Folder => "📁",
            Self::Html => "🌐",
            Self::Css => "🎨",
            Self::Js => "⚡",
            Self::Json => "⚙️",
            Self::Markdown => "📝",
            Self::Image => "🖼️",
            Self::Archive => "📦",
            Self::Text | Self::Pdf | Self::Generic => "📄",
        }
    }

    /// one-line commit summary for the categories worth calling out
    pub fn commit_summary(self) -> Option<&'static str> {
        match self {
            Self::Html => Some("update HTML files"),
            Self::Js => Some("update JavaScript files"),
            Self::Css => Some("update stylesheets"),
            Self::Json => Some("update config files"),
            Self::Markdown => Some("update documentation"),
            _ => None,
        }
    }
}
