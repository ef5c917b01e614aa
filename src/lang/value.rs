//! Package-level constants and variables.

use super::{doc, Entity, LangError, Location, Scope};
use crate::parser::ast::{GenDecl, GenKind, Spec};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Var,
    Const,
}

/// A `var` or `const` declaration, single or grouped.
///
/// The location covers the whole source declaration, including specs that
/// declare only hidden names and are left out of [`Entity::decl`].
#[derive(Debug, Clone)]
pub struct Value {
    kind: ValueKind,
    name: String,
    doc: String,
    decl: GenDecl,
    level: usize,
    location: Location,
}

impl Value {
    /// Build from a declaration whose specs are already filtered to the
    /// visible ones. Returns `None` for type declarations or empty groups.
    pub(crate) fn new(decl: GenDecl, file: &Path, scope: &Scope) -> Option<Self> {
        let kind = match decl.kind {
            GenKind::Var => ValueKind::Var,
            GenKind::Const => ValueKind::Const,
            GenKind::Type => return None,
        };
        let first = decl.specs.iter().find_map(|s| match s {
            Spec::Value(v) => Some(v),
            Spec::Type(_) => None,
        })?;
        let name = first
            .names
            .iter()
            .find(|n| *n != "_")
            .or_else(|| first.names.first())?
            .clone();
        let doc = decl
            .doc
            .clone()
            .or_else(|| (decl.specs.len() == 1).then(|| first.doc.clone()).flatten())
            .unwrap_or_default();
        let location = scope.location(decl.start, decl.end, file);
        Some(Self {
            kind,
            name,
            doc,
            decl,
            level: scope.level,
            location,
        })
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Every name declared by the group, in order. Blank names are skipped.
    pub fn names(&self) -> Vec<&str> {
        self.decl
            .specs
            .iter()
            .filter_map(|s| match s {
                Spec::Value(v) => Some(v.names.iter().map(String::as_str)),
                Spec::Type(_) => None,
            })
            .flatten()
            .filter(|n| *n != "_")
            .collect()
    }
}

impl Entity for Value {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> usize {
        self.level
    }

    fn summary(&self) -> String {
        doc::summary(&self.doc).unwrap_or_else(|| match self.kind {
            ValueKind::Var => format!("{} is a package-level variable.", self.name),
            ValueKind::Const => format!("{} is a package-level constant.", self.name),
        })
    }

    fn doc(&self) -> &str {
        &self.doc
    }

    fn decl(&self) -> Result<String, LangError> {
        Ok(self.decl.to_string())
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Package;
    use std::path::PathBuf;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/function")
    }

    fn load_value(name: &str) -> Value {
        let pkg = Package::load(&fixture(), &Scope::new(fixture())).unwrap();
        pkg.vars()
            .iter()
            .chain(pkg.consts())
            .find(|v| v.decl().is_ok_and(|d| d.contains(name)))
            .cloned()
            .expect("value not found")
    }

    #[test]
    fn value_level() {
        assert_eq!(load_value("Variable").level(), 2);
    }

    #[test]
    fn value_summary() {
        assert_eq!(
            load_value("Variable").summary(),
            "Variable is a package-level variable."
        );
    }

    #[test]
    fn value_decl() {
        assert_eq!(load_value("Variable").decl().unwrap(), "var Variable = 5");
    }

    #[test]
    fn value_location() {
        let val = load_value("Variable");
        let loc = val.location();
        assert_eq!(loc.start.line, 4);
        assert_eq!(loc.start.column, 1);
        assert_eq!(loc.end.line, 4);
        assert_eq!(loc.end.column, 17);
        assert!(loc.filepath.ends_with("value.go"));
    }

    #[test]
    fn documented_const_summary() {
        let val = load_value("Constant");
        assert_eq!(val.kind(), ValueKind::Const);
        assert_eq!(val.summary(), "Constant is the answer.");
    }

    #[test]
    fn group_names() {
        let val = load_value("Red");
        assert_eq!(val.names(), vec!["Red", "Green", "Blue"]);
        assert_eq!(val.name(), "Red");
    }

    fn parse_value(source: &str) -> Value {
        let file = crate::parser::parse_file(Path::new("/w/v.go"), source).unwrap();
        let parsed = crate::parser::ParsedPackage {
            name: file.package.clone(),
            dir: PathBuf::from("/w"),
            import_path: None,
            files: vec![file],
            test_files: Vec::new(),
        };
        let pkg = Package::from_parsed(&parsed, &Scope::new("/w"));
        pkg.vars().iter().chain(pkg.consts()).next().cloned().expect("no value")
    }

    #[test]
    fn location_spans_hidden_specs() {
        let val = parse_value("package p\n\nvar (\n\ta = 1\n\tB = 2\n)\n");
        assert_eq!(val.decl().unwrap(), "var (\n\tB = 2\n)");
        assert_eq!(val.name(), "B");
        assert_eq!(val.location().start.line, 3);
        assert_eq!(val.location().start.column, 1);
        assert_eq!(val.location().end.line, 6);
        assert_eq!(val.location().end.column, 2);
    }

    #[test]
    fn blank_names_are_not_value_names() {
        let val = parse_value("package p\n\nconst _, A = 1, 2\n");
        assert_eq!(val.name(), "A");
        assert_eq!(val.names(), vec!["A"]);
    }
}
