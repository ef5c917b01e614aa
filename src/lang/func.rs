//! Functions and methods.

use super::{doc, Entity, Example, LangError, Location, Scope};
use crate::parser::ast::{print_tokens, FuncDecl};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuncKind {
    Function,
    /// `receiver` is the base type name, e.g. `Point` for `(p *Point)`.
    Method { receiver: String },
}

/// A function, constructor or method.
#[derive(Debug, Clone)]
pub struct Func {
    kind: FuncKind,
    decl: FuncDecl,
    doc: String,
    level: usize,
    location: Location,
    pub(crate) examples: Vec<Example>,
}

impl Func {
    pub(crate) fn new(decl: FuncDecl, file: &Path, scope: &Scope) -> Self {
        let kind = match decl.recv_type() {
            Some(receiver) => FuncKind::Method { receiver },
            None => FuncKind::Function,
        };
        let location = scope.location(decl.start, decl.end, file);
        Self {
            kind,
            doc: decl.doc.clone().unwrap_or_default(),
            decl,
            level: scope.level,
            location,
            examples: Vec::new(),
        }
    }

    pub fn kind(&self) -> &FuncKind {
        &self.kind
    }

    /// Base type name of the receiver, for methods.
    pub fn receiver(&self) -> Option<&str> {
        match &self.kind {
            FuncKind::Method { receiver } => Some(receiver),
            FuncKind::Function => None,
        }
    }

    /// Heading text, e.g. `func New` or `func (p *Point) Scale`.
    pub fn title(&self) -> String {
        match &self.decl.recv {
            Some(recv) => format!("func ({}) {}", print_tokens(recv, 0), self.decl.name),
            None => format!("func {}", self.decl.name),
        }
    }

    /// The declaration on a single line.
    pub fn signature(&self) -> String {
        self.decl.signature()
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }
}

impl Entity for Func {
    fn name(&self) -> &str {
        &self.decl.name
    }

    fn level(&self) -> usize {
        self.level
    }

    fn summary(&self) -> String {
        doc::summary(&self.doc).unwrap_or_else(|| match &self.kind {
            FuncKind::Function => format!("{} is a function.", self.decl.name),
            FuncKind::Method { receiver } => {
                format!("{} is a method of {receiver}.", self.decl.name)
            }
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
