//! The package model and the rules that place each declaration under the
//! package or under one of its types.
//!
//! A function returning exactly one local type becomes a constructor of
//! that type. Examples attach by name, as in `ExampleT_M_suffix`.

use super::{doc, Entity, Example, Func, LangError, Location, Scope, Type, Value};
use crate::parser::ast::{base_type_name, Decl, FuncDecl, GenDecl, GenKind, Spec};
use crate::parser::{self, ParsedPackage, Pos};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Share of a value group's specs that must name the same type for the
/// group to be listed under that type.
const TYPE_ASSOCIATION_THRESHOLD: f64 = 0.75;

/// The documented contents of one Go package.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    import_path: Option<String>,
    dir: PathBuf,
    doc: String,
    level: usize,
    location: Location,
    consts: Vec<Value>,
    vars: Vec<Value>,
    types: Vec<Type>,
    funcs: Vec<Func>,
    examples: Vec<Example>,
}

impl Package {
    /// Parse the package in `dir` and build its model.
    pub fn load(dir: &Path, scope: &Scope) -> Result<Self, LangError> {
        let parsed = parser::parse_dir(dir)?;
        Ok(Self::from_parsed(&parsed, scope))
    }

    /// Build the model of an already parsed package.
    pub fn from_parsed(parsed: &ParsedPackage, scope: &Scope) -> Self {
        Builder::new(parsed, scope).build()
    }

    /// Import path from `go.mod`, when known.
    pub fn import_path(&self) -> Option<&str> {
        self.import_path.as_deref()
    }

    /// Absolute directory of the package.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Constant groups not attached to a type, in declaration order.
    pub fn consts(&self) -> &[Value] {
        &self.consts
    }

    /// Variable groups not attached to a type, in declaration order.
    pub fn vars(&self) -> &[Value] {
        &self.vars
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    /// Functions that are neither methods nor constructors of a local type.
    pub fn funcs(&self) -> &[Func] {
        &self.funcs
    }

    /// Package-level examples.
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }
}

impl Entity for Package {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> usize {
        self.level
    }

    fn summary(&self) -> String {
        doc::summary(&self.doc)
            .unwrap_or_else(|| format!("Package {} has no package documentation.", self.name))
    }

    fn doc(&self) -> &str {
        &self.doc
    }

    fn decl(&self) -> Result<String, LangError> {
        Err(LangError::DeclUnavailable {
            kind: "package",
            name: self.name.clone(),
        })
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

// -- Construction -------------------------------------------------------------

/// Where an example is listed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExampleTarget {
    Package,
    Func(String),
    Type(String),
    Method(String, String),
}

struct Builder<'a> {
    parsed: &'a ParsedPackage,
    scope: &'a Scope,
    top: Scope,
    member: Scope,
    types: Vec<Type>,
    type_index: HashMap<String, usize>,
}

impl<'a> Builder<'a> {
    fn new(parsed: &'a ParsedPackage, scope: &'a Scope) -> Self {
        Self {
            parsed,
            scope,
            top: scope.inc(1),
            member: scope.inc(2),
            types: Vec::new(),
            type_index: HashMap::new(),
        }
    }

    fn build(mut self) -> Package {
        let parsed = self.parsed;
        let mut values: Vec<(GenDecl, Option<String>, &Path)> = Vec::new();
        let mut funcs: Vec<(FuncDecl, &Path)> = Vec::new();

        for file in &parsed.files {
            for decl in &file.decls {
                match decl {
                    Decl::Gen(g) if g.kind == GenKind::Type => self.add_types(g, &file.path),
                    Decl::Gen(g) => {
                        if let Some(visible) = self.visible_values(g) {
                            values.push((visible, dominant_type(g), &file.path));
                        }
                    }
                    Decl::Func(f) => {
                        if self.scope.is_visible(&f.name) {
                            funcs.push((f.clone(), &file.path));
                        }
                    }
                }
            }
        }

        let (consts, vars) = self.place_values(values);
        let mut funcs = self.place_funcs(funcs);
        let mut examples = Vec::new();
        self.place_examples(&mut funcs, &mut examples);

        let (doc, location) = self.package_doc();
        Package {
            name: parsed.name.clone(),
            import_path: parsed.import_path.clone(),
            dir: parsed.dir.clone(),
            doc,
            level: self.scope.level,
            location,
            consts,
            vars,
            types: self.types,
            funcs,
            examples,
        }
    }

    fn package_doc(&self) -> (String, Location) {
        match self.parsed.doc_file() {
            Some(file) => (
                file.doc.clone().unwrap_or_default(),
                self.scope.location(file.package_start, file.package_end, &file.path),
            ),
            None => (
                String::new(),
                self.scope.location(Pos::new(1, 1), Pos::new(1, 1), &self.parsed.dir),
            ),
        }
    }

    fn add_types(&mut self, decl: &GenDecl, file: &Path) {
        for spec in &decl.specs {
            let Spec::Type(spec) = spec else { continue };
            if !self.scope.is_visible(&spec.name) {
                continue;
            }
            let (doc, start, end) = if decl.grouped {
                (spec.doc.clone(), spec.start, spec.end)
            } else {
                (decl.doc.clone().or_else(|| spec.doc.clone()), decl.start, decl.end)
            };
            let location = self.top.location(start, end, file);
            let mut shown = spec.clone();
            if shown.filter_members(|n| self.scope.is_visible(n)) {
                tracing::debug!(type_name = %spec.name, "hiding unexported members");
            }
            self.type_index.insert(spec.name.clone(), self.types.len());
            self.types.push(Type::new(shown, doc, location, &self.top));
        }
    }

    /// Restrict each spec to its visible names and drop the specs left
    /// empty; `None` when nothing is left.
    fn visible_values(&self, decl: &GenDecl) -> Option<GenDecl> {
        let specs: Vec<Spec> = decl
            .specs
            .iter()
            .filter_map(|s| match s {
                Spec::Value(v) => v
                    .filter_names(decl.kind, |n| self.scope.is_visible(n))
                    .map(Spec::Value),
                Spec::Type(_) => None,
            })
            .collect();
        if specs.is_empty() {
            return None;
        }
        Some(GenDecl {
            specs,
            ..decl.clone()
        })
    }

    fn place_values(
        &mut self,
        values: Vec<(GenDecl, Option<String>, &Path)>,
    ) -> (Vec<Value>, Vec<Value>) {
        let mut consts = Vec::new();
        let mut vars = Vec::new();
        for (decl, dominant, file) in values {
            let kind = decl.kind;
            let owner = dominant.and_then(|name| self.type_index.get(&name).copied());
            let scope = if owner.is_some() { &self.member } else { &self.top };
            let Some(value) = Value::new(decl, file, scope) else {
                continue;
            };
            match (owner, kind) {
                (Some(i), GenKind::Const) => self.types[i].consts.push(value),
                (Some(i), _) => self.types[i].vars.push(value),
                (None, GenKind::Const) => consts.push(value),
                (None, _) => vars.push(value),
            }
        }
        (consts, vars)
    }

    fn place_funcs(&mut self, funcs: Vec<(FuncDecl, &Path)>) -> Vec<Func> {
        let mut top = Vec::new();
        for (decl, file) in funcs {
            if decl.recv.is_some() {
                let owner = decl.recv_type().and_then(|name| self.type_index.get(&name).copied());
                match owner {
                    Some(i) => self.types[i].methods.push(Func::new(decl, file, &self.member)),
                    None => tracing::debug!(method = %decl.name, "dropping method of undocumented type"),
                }
                continue;
            }
            match self.constructed_type(&decl) {
                Some(i) => {
                    tracing::debug!(func = %decl.name, type_name = %self.types[i].name(), "attaching constructor");
                    self.types[i].funcs.push(Func::new(decl, file, &self.member));
                }
                None => top.push(Func::new(decl, file, &self.top)),
            }
        }
        top
    }

    /// The single local type a function returns, if any.
    fn constructed_type(&self, decl: &FuncDecl) -> Option<usize> {
        let found: HashSet<usize> = decl
            .result_types()
            .iter()
            .filter_map(|ty| base_type_name(ty))
            .filter_map(|name| self.type_index.get(&name).copied())
            .collect();
        match found.len() {
            1 => found.into_iter().next(),
            _ => None,
        }
    }

    fn place_examples(&mut self, funcs: &mut [Func], examples: &mut Vec<Example>) {
        let mut targets: HashMap<String, ExampleTarget> = HashMap::new();
        for f in funcs.iter() {
            targets.insert(f.name().to_string(), ExampleTarget::Func(f.name().to_string()));
        }
        for ty in &self.types {
            let name = ty.name().to_string();
            targets.insert(name.clone(), ExampleTarget::Type(name.clone()));
            for f in &ty.funcs {
                targets.insert(f.name().to_string(), ExampleTarget::Func(f.name().to_string()));
            }
            for m in &ty.methods {
                let target = ExampleTarget::Method(name.clone(), m.name().to_string());
                targets.insert(format!("{name}_{}", m.name()), target);
            }
        }

        let parsed = self.parsed;
        for file in &parsed.test_files {
            for decl in &file.decls {
                let Decl::Func(f) = decl else { continue };
                if !is_example_func(f) {
                    continue;
                }
                let Some((target, suffix)) = classify_example(&f.name, &targets) else {
                    tracing::debug!(example = %f.name, "example matches no documented symbol");
                    continue;
                };
                self.attach_example(f, &file.path, target, &suffix, funcs, examples);
            }
        }
    }

    fn attach_example(
        &mut self,
        decl: &FuncDecl,
        file: &Path,
        target: ExampleTarget,
        suffix: &str,
        funcs: &mut [Func],
        examples: &mut Vec<Example>,
    ) {
        match target {
            ExampleTarget::Package => {
                let name = self.parsed.name.as_str();
                examples.push(Example::new(decl, suffix, name, file, &self.top));
            }
            ExampleTarget::Type(name) => {
                if let Some(&i) = self.type_index.get(&name) {
                    let ty = &mut self.types[i];
                    ty.examples.push(Example::new(decl, suffix, &name, file, &self.member));
                }
            }
            ExampleTarget::Func(name) => {
                let func = funcs
                    .iter_mut()
                    .chain(self.types.iter_mut().flat_map(|t| t.funcs.iter_mut()))
                    .find(|f| f.name() == name);
                if let Some(func) = func {
                    let scope = self.scope.inc(func.level() + 1 - self.scope.level);
                    func.examples.push(Example::new(decl, suffix, &name, file, &scope));
                }
            }
            ExampleTarget::Method(ty, method) => {
                let scope = self.scope.inc(3);
                let found = self
                    .type_index
                    .get(&ty)
                    .and_then(|&i| self.types[i].methods.iter_mut().find(|m| m.name() == method));
                if let Some(func) = found {
                    let target = format!("{ty}.{method}");
                    func.examples.push(Example::new(decl, suffix, &target, file, &scope));
                }
            }
        }
    }
}

/// The type named by every typed spec of a value group, when it covers
/// enough of the group. Untyped constants inherit the type of the spec above.
fn dominant_type(decl: &GenDecl) -> Option<String> {
    let mut dominant: Option<String> = None;
    let mut count = 0usize;
    let mut prev: Option<String> = None;
    let mut total = 0usize;

    for spec in &decl.specs {
        let Spec::Value(v) = spec else { continue };
        total += 1;
        let name = if !v.ty.is_empty() {
            v.type_name()
        } else if decl.kind == GenKind::Const && v.values.is_empty() {
            prev.clone()
        } else {
            None
        };
        if let Some(name) = &name {
            match &dominant {
                Some(d) if d != name => return None,
                _ => dominant = Some(name.clone()),
            }
            count += 1;
        }
        prev = name;
    }

    let name = dominant?;
    let needed = (total as f64 * TYPE_ASSOCIATION_THRESHOLD) as usize;
    (count >= needed).then_some(name)
}

/// `func ExampleXxx()` with no receiver, parameters or results.
fn is_example_func(decl: &FuncDecl) -> bool {
    decl.recv.is_none()
        && decl.name.starts_with("Example")
        && decl.params.len() == 2
        && decl.results.is_empty()
        && decl.type_params.is_empty()
}

/// Match an example name against the documented identifiers, trying the whole
/// name first and then every split at an underscore from the right. A suffix
/// must start with a lower-case letter.
fn classify_example(
    name: &str,
    targets: &HashMap<String, ExampleTarget>,
) -> Option<(ExampleTarget, String)> {
    let rest = name.strip_prefix("Example")?;
    let mut cut = Some(rest.len());
    while let Some(i) = cut {
        let prefix = &rest[..i];
        let suffix = rest.get(i + 1..).unwrap_or("");
        if suffix.is_empty() || suffix.starts_with(char::is_lowercase) {
            if prefix.is_empty() {
                return Some((ExampleTarget::Package, suffix.to_string()));
            }
            if let Some(target) = targets.get(prefix) {
                return Some((target.clone(), suffix.to_string()));
            }
        }
        cut = prefix.rfind('_');
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;
    use pretty_assertions::assert_eq;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/function")
    }

    fn load(include_unexported: bool) -> Package {
        let scope = Scope::new(fixture()).with_unexported(include_unexported);
        Package::load(&fixture(), &scope).unwrap()
    }

    fn names<E: Entity>(entities: &[E]) -> Vec<&str> {
        entities.iter().map(|e| e.name()).collect()
    }

    fn point(pkg: &Package) -> &Type {
        pkg.types().iter().find(|t| t.name() == "Point").unwrap()
    }

    fn first_gen(source: &str) -> GenDecl {
        let file = parse_file(Path::new("/w/a.go"), source).unwrap();
        match file.decls.into_iter().next() {
            Some(Decl::Gen(g)) => g,
            _ => panic!("expected general declaration"),
        }
    }

    #[test]
    fn package_metadata() {
        let pkg = load(false);
        assert_eq!(pkg.name(), "function");
        assert_eq!(pkg.level(), 1);
        assert_eq!(pkg.import_path(), Some("example.com/fixtures/function"));
        assert_eq!(
            pkg.summary(),
            "Package function is a fixture for the documentation model."
        );
        assert!(pkg.location().filepath.ends_with("doc.go"));
        assert!(matches!(
            pkg.decl(),
            Err(LangError::DeclUnavailable { kind: "package", .. })
        ));
    }

    #[test]
    fn top_level_entities_in_declaration_order() {
        let pkg = load(false);
        assert_eq!(names(pkg.vars()), vec!["Variable"]);
        assert_eq!(names(pkg.consts()), vec!["Constant", "Red"]);
        assert_eq!(names(pkg.funcs()), vec!["Add", "Undocumented"]);
        assert_eq!(names(pkg.types()), vec!["Point", "Kind"]);
    }

    #[test]
    fn queries_are_stable() {
        let pkg = load(false);
        assert_eq!(names(pkg.funcs()), names(pkg.funcs()));
    }

    #[test]
    fn constructors_and_methods_attach_to_types() {
        let pkg = load(false);
        let point = point(&pkg);
        assert_eq!(names(point.funcs()), vec!["NewPoint"]);
        assert_eq!(names(point.methods()), vec!["Scale", "String"]);
        assert_eq!(point.level(), 2);
        assert_eq!(point.funcs()[0].level(), 3);
        assert_eq!(point.methods()[0].title(), "func (p *Point) Scale");
        assert_eq!(point.methods()[0].receiver(), Some("Point"));
        assert_eq!(point.decl().unwrap(), "type Point struct {\n\tX, Y int\n}");
    }

    #[test]
    fn typed_const_group_attaches_to_type() {
        let pkg = load(false);
        let kind = pkg.types().iter().find(|t| t.name() == "Kind").unwrap();
        assert_eq!(names(kind.consts()), vec!["Origin"]);
        assert_eq!(kind.consts()[0].level(), 3);
    }

    #[test]
    fn unexported_names_need_opt_in() {
        let pkg = load(false);
        assert!(!pkg.funcs().iter().any(|f| f.name() == "hidden"));

        let pkg = load(true);
        assert!(pkg.funcs().iter().any(|f| f.name() == "hidden"));
        let reset = point(&pkg).methods().iter().find(|m| m.name() == "reset").unwrap();
        assert_eq!(reset.summary(), "reset is a method of Point.");
    }

    #[test]
    fn synthesized_summaries() {
        let pkg = load(false);
        let undocumented = pkg.funcs().iter().find(|f| f.name() == "Undocumented").unwrap();
        assert_eq!(undocumented.summary(), "Undocumented is a function.");
        assert_eq!(pkg.funcs()[0].summary(), "Add returns the sum of a and b.");
    }

    #[test]
    fn examples_attach_by_name() {
        let pkg = load(false);
        assert_eq!(pkg.examples().len(), 1);
        assert_eq!(pkg.examples()[0].level(), 2);
        assert_eq!(
            pkg.examples()[0].summary(),
            "Example demonstrates usage of function."
        );

        let add = &pkg.funcs()[0];
        assert_eq!(add.examples().len(), 1);
        assert_eq!(add.examples()[0].level(), 3);
        assert_eq!(add.examples()[0].output(), Some("4"));

        let point = point(&pkg);
        assert_eq!(point.examples().len(), 1);
        assert_eq!(point.examples()[0].title(), "Basic");

        let scale = &point.methods()[0];
        let example = &scale.examples()[0];
        assert_eq!(example.level(), 4);
        assert_eq!(example.summary(), "Example demonstrates usage of Point.Scale.");
        assert!(example.code().starts_with("p := function.NewPoint(1, 2)"));
        assert!(example.decl().is_err());
    }

    fn from_source(source: &str, include_unexported: bool) -> Package {
        let file = parse_file(Path::new("/w/p.go"), source).unwrap();
        let parsed = ParsedPackage {
            name: file.package.clone(),
            dir: PathBuf::from("/w"),
            import_path: None,
            files: vec![file],
            test_files: Vec::new(),
        };
        Package::from_parsed(&parsed, &Scope::new("/w").with_unexported(include_unexported))
    }

    #[test]
    fn hidden_names_in_value_specs_stay_hidden() {
        let pkg = from_source("package p\n\nvar hidden, Shown = 1, 2\n", false);
        let shown = &pkg.vars()[0];
        assert_eq!(shown.name(), "Shown");
        assert_eq!(shown.names(), vec!["Shown"]);
        assert_eq!(shown.decl().unwrap(), "var Shown = 2");
        assert_eq!(shown.summary(), "Shown is a package-level variable.");

        let pkg = from_source("package p\n\nvar hidden, Shown = 1, 2\n", true);
        assert_eq!(pkg.vars()[0].name(), "hidden");
        assert_eq!(pkg.vars()[0].decl().unwrap(), "var hidden, Shown = 1, 2");
    }

    #[test]
    fn hidden_value_names_without_pairs() {
        let pkg = from_source(
            "package p\n\nvar a, B = pair()\n\nvar x, Y int\n\nconst c, D = 1, 2\n\nvar e, f = 1, 2\n",
            false,
        );
        let decls: Vec<String> = pkg.vars().iter().map(|v| v.decl().unwrap()).collect();
        assert_eq!(decls, vec!["var _, B = pair()", "var Y int"]);
        assert_eq!(names(pkg.vars()), vec!["B", "Y"]);
        assert_eq!(pkg.consts()[0].decl().unwrap(), "const _, D = 1, 2");
        assert_eq!(pkg.consts()[0].name(), "D");
    }

    #[test]
    fn unexported_members_are_filtered_from_type_decls() {
        let source = "package p\n\ntype T struct {\n\tA int\n\tsecret string\n}\n\ntype R interface {\n\tRead() error\n\tclose()\n}\n";
        let pkg = from_source(source, false);
        assert_eq!(
            pkg.types()[0].decl().unwrap(),
            "type T struct {\n\tA int\n\t// contains filtered or unexported fields\n}"
        );
        assert_eq!(
            pkg.types()[1].decl().unwrap(),
            "type R interface {\n\tRead() error\n\t// contains filtered or unexported methods\n}"
        );

        let pkg = from_source(source, true);
        assert_eq!(
            pkg.types()[0].decl().unwrap(),
            "type T struct {\n\tA int\n\tsecret string\n}"
        );
    }

    #[test]
    fn dominant_type_needs_every_typed_spec_to_agree() {
        let g = first_gen("package p\nconst (\n\tA Kind = iota\n\tB\n\tC\n)\n");
        assert_eq!(dominant_type(&g).as_deref(), Some("Kind"));

        let g = first_gen("package p\nconst (\n\tA Kind = 1\n\tB Other = 2\n)\n");
        assert_eq!(dominant_type(&g), None);
    }

    #[test]
    fn dominant_type_threshold() {
        let g = first_gen("package p\nvar (\n\tA Kind\n\tB = 1\n\tC = 2\n)\n");
        assert_eq!(dominant_type(&g), None);

        let g = first_gen("package p\nvar (\n\tA Kind\n\tB Kind\n\tC Kind\n\tD = 1\n)\n");
        assert_eq!(dominant_type(&g).as_deref(), Some("Kind"));
    }

    #[test]
    fn example_names() {
        let mut targets = HashMap::new();
        targets.insert("Add".to_string(), ExampleTarget::Func("Add".into()));
        targets.insert("T".to_string(), ExampleTarget::Type("T".into()));
        targets.insert(
            "T_M".to_string(),
            ExampleTarget::Method("T".into(), "M".into()),
        );

        let classify = |name: &str| classify_example(name, &targets);
        assert_eq!(classify("Example"), Some((ExampleTarget::Package, String::new())));
        assert_eq!(
            classify("Example_second"),
            Some((ExampleTarget::Package, "second".into()))
        );
        assert_eq!(
            classify("ExampleAdd_big_numbers"),
            Some((ExampleTarget::Func("Add".into()), "big_numbers".into()))
        );
        assert_eq!(
            classify("ExampleT_M"),
            Some((ExampleTarget::Method("T".into(), "M".into()), String::new()))
        );
        assert_eq!(classify("ExampleT_Upper"), None);
        assert_eq!(classify("ExampleUnknown"), None);
    }
}
