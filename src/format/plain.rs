//! Plain markdown without anchors, permalinks or HTML.

use super::Format;
use crate::lang::Location;

/// Markdown for renderers that support only the common subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMarkdown;

impl Format for PlainMarkdown {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn local_href(&self, _heading: &str) -> String {
        String::new()
    }

    fn code_href(&self, _location: &Location) -> String {
        String::new()
    }

    fn accordion(&self, title: &str, body: &str) -> String {
        format!("{}\n\n{body}", self.bold(title))
    }
}
