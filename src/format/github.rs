//! GitHub-flavored markdown.

use super::{anchor, repo_file, Format};
use crate::lang::Location;

/// Markdown for GitHub and hosts that copy its anchor and permalink scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubFlavoredMarkdown;

impl Format for GitHubFlavoredMarkdown {
    fn name(&self) -> &'static str {
        "github"
    }

    fn local_href(&self, heading: &str) -> String {
        format!("#{}", anchor::github_slug(heading))
    }

    fn code_href(&self, location: &Location) -> String {
        let Some((repo, path)) = repo_file(location) else {
            return String::new();
        };
        format!(
            "{}/blob/{}/{}#L{}-L{}",
            repo.remote.trim_end_matches('/'),
            repo.default_branch,
            path,
            location.start.line,
            location.end.line
        )
    }

    /// Angle brackets keep URLs with spaces or parentheses intact.
    fn link(&self, text: &str, url: &str) -> String {
        if url.is_empty() {
            return text.to_string();
        }
        format!("[{text}](<{url}>)")
    }
}
