//! Source locations and the repository they belong to.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

pub use crate::parser::Pos as Position;

/// The hosting repository that contains the documented files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Repo {
    /// Browsable remote URL, e.g. `https://github.com/org/project`.
    pub remote: String,
    pub default_branch: String,
    /// Work directory relative to the repository root, `/` for the root itself.
    pub path_from_root: String,
}

/// The span of a declaration inside a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
    /// Absolute path of the file.
    pub filepath: PathBuf,
    /// Absolute work directory the documentation is generated from.
    pub work_dir: PathBuf,
    pub repo: Option<Arc<Repo>>,
}

impl Location {
    pub fn new(
        start: Position,
        end: Position,
        filepath: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        repo: Option<Arc<Repo>>,
    ) -> Self {
        let end = end.max(start);
        Self {
            start,
            end,
            filepath: filepath.into(),
            work_dir: work_dir.into(),
            repo,
        }
    }

    /// File path relative to the work directory, `/`-separated.
    pub fn relative_path(&self) -> Option<String> {
        let rel = self.filepath.strip_prefix(&self.work_dir).ok()?;
        Some(join_normal(rel.components()).join("/"))
    }

    /// File path relative to the repository root, `/`-separated. `None` when
    /// there is no repository or the file is outside the work directory.
    pub fn repo_path(&self) -> Option<String> {
        let repo = self.repo.as_ref()?;
        let rel = self.filepath.strip_prefix(&self.work_dir).ok()?;
        let mut parts: Vec<String> = repo
            .path_from_root
            .split(['/', '\\'])
            .filter(|p| !p.is_empty() && *p != ".")
            .map(str::to_string)
            .collect();
        parts.extend(join_normal(rel.components()));
        Some(parts.join("/"))
    }
}

fn join_normal<'a>(components: impl Iterator<Item = Component<'a>>) -> Vec<String> {
    components
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Absolute form of `path`, falling back to the path itself.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(path_from_root: &str) -> Option<Arc<Repo>> {
        Some(Arc::new(Repo {
            remote: "https://example.com/org/repo".into(),
            default_branch: "main".into(),
            path_from_root: path_from_root.into(),
        }))
    }

    #[test]
    fn repo_path_at_root() {
        let loc = Location::new(
            Position::new(1, 1),
            Position::new(1, 5),
            "/work/subdir/file.go",
            "/work",
            repo("/"),
        );
        assert_eq!(loc.relative_path().as_deref(), Some("subdir/file.go"));
        assert_eq!(loc.repo_path().as_deref(), Some("subdir/file.go"));
    }

    #[test]
    fn repo_path_below_root() {
        let loc = Location::new(
            Position::new(1, 1),
            Position::new(1, 5),
            "/work/file.go",
            "/work",
            repo("/pkg/util"),
        );
        assert_eq!(loc.repo_path().as_deref(), Some("pkg/util/file.go"));
    }

    #[test]
    fn no_repo_no_repo_path() {
        let loc = Location::new(Position::new(1, 1), Position::new(1, 2), "/w/a.go", "/w", None);
        assert_eq!(loc.repo_path(), None);
    }

    #[test]
    fn end_never_precedes_start() {
        let loc = Location::new(Position::new(4, 1), Position::new(2, 1), "/w/a.go", "/w", None);
        assert_eq!(loc.end, Position::new(4, 1));
    }
}
