//! Type declarations together with the values, constructors and methods
//! listed under them.

use super::{doc, Entity, Example, Func, LangError, Location, Scope, Value};
use crate::parser::ast::TypeSpec;

/// A named type with the declarations attached to it.
#[derive(Debug, Clone)]
pub struct Type {
    spec: TypeSpec,
    doc: String,
    level: usize,
    location: Location,
    pub(crate) consts: Vec<Value>,
    pub(crate) vars: Vec<Value>,
    pub(crate) funcs: Vec<Func>,
    pub(crate) methods: Vec<Func>,
    pub(crate) examples: Vec<Example>,
}

impl Type {
    pub(crate) fn new(spec: TypeSpec, doc: Option<String>, location: Location, scope: &Scope) -> Self {
        Self {
            spec,
            doc: doc.unwrap_or_default(),
            level: scope.level,
            location,
            consts: Vec::new(),
            vars: Vec::new(),
            funcs: Vec::new(),
            methods: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Heading text, e.g. `type Point`.
    pub fn title(&self) -> String {
        format!("type {}", self.spec.name)
    }

    pub fn is_alias(&self) -> bool {
        self.spec.alias
    }

    /// Constant groups of this type.
    pub fn consts(&self) -> &[Value] {
        &self.consts
    }

    pub fn vars(&self) -> &[Value] {
        &self.vars
    }

    /// Constructors: functions returning this type.
    pub fn funcs(&self) -> &[Func] {
        &self.funcs
    }

    pub fn methods(&self) -> &[Func] {
        &self.methods
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }
}

impl Entity for Type {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn level(&self) -> usize {
        self.level
    }

    fn summary(&self) -> String {
        doc::summary(&self.doc).unwrap_or_else(|| format!("{} is a type.", self.spec.name))
    }

    fn doc(&self) -> &str {
        &self.doc
    }

    fn decl(&self) -> Result<String, LangError> {
        Ok(format!("type {}", self.spec))
    }

    fn location(&self) -> &Location {
        &self.location
    }
}
