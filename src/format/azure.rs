//! Azure DevOps wiki markdown.

use super::{anchor, repo_file, Format};
use crate::lang::Location;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Query-component encoding: everything but unreserved characters.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, Copy, Default)]
pub struct AzureDevOpsMarkdown;

impl Format for AzureDevOpsMarkdown {
    fn name(&self) -> &'static str {
        "azure-devops"
    }

    fn local_href(&self, heading: &str) -> String {
        format!("#{}", anchor::azure_slug(heading))
    }

    fn code_href(&self, location: &Location) -> String {
        let Some((repo, path)) = repo_file(location) else {
            return String::new();
        };
        let path = format!("/{path}");
        format!(
            "{}?path={}&version=GB{}&line={}&lineEnd={}&lineStartColumn={}&lineEndColumn={}&lineStyle=plain&_a=contents",
            repo.remote.trim_end_matches('/'),
            utf8_percent_encode(&path, QUERY),
            utf8_percent_encode(&repo.default_branch, QUERY),
            location.start.line,
            location.end.line,
            location.start.column,
            location.end.column
        )
    }
}
