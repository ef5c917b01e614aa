//! Documentation model: the entities of a Go package, their nesting level,
//! summary, declaration text and source location.

pub mod doc;
mod example;
mod func;
mod location;
mod package;
mod types;
mod value;

pub use example::Example;
pub use func::{Func, FuncKind};
pub use location::{Location, Position, Repo};
pub use package::Package;
pub use types::Type;
pub use value::{Value, ValueKind};

use crate::parser::ParseError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors raised by the documentation model.
#[derive(Debug, thiserror::Error)]
pub enum LangError {
    #[error("{kind} {name} has no declaration")]
    DeclUnavailable { kind: &'static str, name: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Behaviour shared by every documented symbol.
pub trait Entity {
    fn name(&self) -> &str;

    /// Nesting depth: 1 for the package, 2 for its symbols, one more for
    /// every level of containment below that.
    fn level(&self) -> usize;

    /// One sentence describing the entity. Never empty.
    fn summary(&self) -> String;

    /// Full doc comment text, empty when there is none.
    fn doc(&self) -> &str;

    /// Declaration source, re-printed from the parsed declaration.
    fn decl(&self) -> Result<String, LangError>;

    /// Span of the declaration, doc comment excluded.
    fn location(&self) -> &Location;
}

/// Context shared while building the entities of one package.
#[derive(Debug, Clone)]
pub struct Scope {
    pub work_dir: PathBuf,
    pub repo: Option<Arc<Repo>>,
    pub level: usize,
    pub include_unexported: bool,
}

impl Scope {
    /// Scope for a package documented from `work_dir`, at level 1.
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        Self {
            work_dir: location::absolute(work_dir.as_ref()),
            repo: None,
            level: 1,
            include_unexported: false,
        }
    }

    pub fn with_repo(mut self, repo: Option<Repo>) -> Self {
        self.repo = repo.map(Arc::new);
        self
    }

    pub fn with_unexported(mut self, include: bool) -> Self {
        self.include_unexported = include;
        self
    }

    /// Scope of an entity nested `step` levels deeper.
    pub fn inc(&self, step: usize) -> Self {
        Self {
            level: self.level + step,
            ..self.clone()
        }
    }

    pub(crate) fn location(&self, start: Position, end: Position, filepath: &Path) -> Location {
        Location::new(start, end, filepath, &self.work_dir, self.repo.clone())
    }

    pub(crate) fn is_visible(&self, name: &str) -> bool {
        self.include_unexported || is_exported(name)
    }
}

/// Go's export rule: the identifier starts with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inc_keeps_context() {
        let scope = Scope::new("/work").with_unexported(true);
        let nested = scope.inc(2);
        assert_eq!(nested.level, 3);
        assert!(nested.include_unexported);
        assert_eq!(nested.work_dir, scope.work_dir);
    }

    #[test]
    fn exported_names() {
        assert!(is_exported("Variable"));
        assert!(is_exported("Élan"));
        assert!(!is_exported("variable"));
        assert!(!is_exported("_x"));
        assert!(!is_exported(""));
    }
}
