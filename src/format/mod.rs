//! Formatter module: trait-based markdown dialects.

pub mod anchor;
mod azure;
mod github;
mod gitlab;
mod plain;

pub use azure::AzureDevOpsMarkdown;
pub use github::GitHubFlavoredMarkdown;
pub use gitlab::GitLabFlavoredMarkdown;
pub use plain::PlainMarkdown;

use crate::lang::Location;

/// Deepest ATX heading markdown supports.
pub const MAX_HEADER_LEVEL: usize = 6;

const LIST_INDENT: &str = "  ";

/// Names accepted by [`create_format`].
pub const FORMAT_NAMES: [&str; 4] = ["github", "gitlab", "azure-devops", "plain"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("format: header level cannot be less than 1")]
    InvalidHeaderLevel,

    #[error("unknown format: {0}. Use github, gitlab, azure-devops, or plain")]
    UnknownFormat(String),
}

/// Text shaping for one markdown dialect.
///
/// Implementations hold no state; the renderer picks one at startup and only
/// talks to it through this trait.
pub trait Format: Send + Sync {
    fn name(&self) -> &'static str;

    fn bold(&self, text: &str) -> String {
        format!("**{text}**")
    }

    /// Fenced code block. The code is written verbatim.
    fn code_block(&self, language: &str, code: &str) -> String {
        let fence = fence_for(code);
        format!("{fence}{language}\n{code}\n{fence}")
    }

    /// ATX heading with `*` escaped. Levels above 6 render as 6.
    fn header(&self, level: usize, text: &str) -> Result<String, FormatError> {
        heading(level, &text.replace('*', "\\*"))
    }

    /// ATX heading with `text` inserted as is.
    fn raw_header(&self, level: usize, text: &str) -> Result<String, FormatError> {
        heading(level, text)
    }

    /// In-document anchor for a heading with the given text.
    fn local_href(&self, heading: &str) -> String;

    /// Permalink to the lines of `location` on the hosting service, or an
    /// empty string without repository information.
    fn code_href(&self, location: &Location) -> String;

    /// Inline link. An empty URL leaves the bare text.
    fn link(&self, text: &str, url: &str) -> String {
        if url.is_empty() {
            return text.to_string();
        }
        format!("[{text}]({url})")
    }

    /// Unordered list line indented two spaces per depth. Empty text gives
    /// an empty string so the caller can drop the entry.
    fn list_entry(&self, depth: usize, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        format!("{}- {text}", LIST_INDENT.repeat(depth))
    }

    /// Backslash-escape markdown control characters in body text.
    fn escape(&self, text: &str) -> String {
        escape(text)
    }

    /// Collapsible block with a title.
    fn accordion(&self, title: &str, body: &str) -> String {
        format!("<details><summary>{title}</summary>\n<p>\n\n{body}\n\n</p>\n</details>")
    }
}

/// Create the formatter for a dialect name.
pub fn create_format(name: &str) -> Result<Box<dyn Format>, FormatError> {
    match name {
        "github" => Ok(Box::new(GitHubFlavoredMarkdown)),
        "gitlab" => Ok(Box::new(GitLabFlavoredMarkdown)),
        "azure-devops" => Ok(Box::new(AzureDevOpsMarkdown)),
        "plain" => Ok(Box::new(PlainMarkdown)),
        _ => Err(FormatError::UnknownFormat(name.to_string())),
    }
}

fn heading(level: usize, text: &str) -> Result<String, FormatError> {
    if level < 1 {
        return Err(FormatError::InvalidHeaderLevel);
    }
    let marks = "#".repeat(level.min(MAX_HEADER_LEVEL));
    Ok(format!("{marks} {text}"))
}

/// A backtick fence longer than any backtick run inside `code`.
fn fence_for(code: &str) -> String {
    let longest = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Path of the location relative to the repository root together with the
/// repository, when both are known.
fn repo_file(location: &Location) -> Option<(&crate::lang::Repo, String)> {
    let repo = location.repo.as_deref()?;
    let path = location.repo_path()?;
    Some((repo, path))
}
