//! GitLab-flavored markdown.

use super::{anchor, repo_file, Format};
use crate::lang::Location;

#[derive(Debug, Clone, Copy, Default)]
pub struct GitLabFlavoredMarkdown;

impl Format for GitLabFlavoredMarkdown {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    fn local_href(&self, heading: &str) -> String {
        format!("#{}", anchor::gitlab_slug(heading))
    }

    fn code_href(&self, location: &Location) -> String {
        let Some((repo, path)) = repo_file(location) else {
            return String::new();
        };
        format!(
            "{}/-/blob/{}/{}#L{}-{}",
            repo.remote.trim_end_matches('/'),
            repo.default_branch,
            path,
            location.start.line,
            location.end.line
        )
    }
}
