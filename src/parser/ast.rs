//! Declaration nodes for the top level of a Go file, and the printer that
//! turns them back into normalized source text.

use super::token::{Pos, Token, TokenKind};
use std::fmt;

/// Keyword of a general declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenKind {
    Var,
    Const,
    Type,
}

impl GenKind {
    pub fn keyword(self) -> &'static str {
        match self {
            GenKind::Var => "var",
            GenKind::Const => "const",
            GenKind::Type => "type",
        }
    }
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

/// `var`, `const` or `type`, either single or parenthesized.
#[derive(Debug, Clone)]
pub struct GenDecl {
    pub kind: GenKind,
    pub doc: Option<String>,
    pub grouped: bool,
    pub specs: Vec<Spec>,
    pub start: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Value(ValueSpec),
    Type(TypeSpec),
}

/// `A, B T = 1, 2` inside a var or const declaration.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub doc: Option<String>,
    pub names: Vec<String>,
    pub ty: Vec<Token>,
    pub values: Vec<Token>,
    pub start: Pos,
    pub end: Pos,
}

/// `Name[P any] = Underlying` inside a type declaration.
#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub doc: Option<String>,
    pub name: String,
    pub type_params: Vec<Token>,
    pub alias: bool,
    pub ty: Vec<Token>,
    /// Set when struct fields or interface methods were filtered out of `ty`.
    pub filtered: Option<FilteredBody>,
    pub start: Pos,
    pub end: Pos,
}

/// A struct or interface body with hidden members removed.
#[derive(Debug, Clone)]
pub struct FilteredBody {
    /// `struct` or `interface`.
    pub keyword: String,
    /// Remaining fields or methods without separators and comments.
    pub members: Vec<Vec<Token>>,
}

/// A function or method declaration. `end` is the end of the signature.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub doc: Option<String>,
    /// Receiver list without the surrounding parentheses.
    pub recv: Option<Vec<Token>>,
    pub name: String,
    pub type_params: Vec<Token>,
    /// Parameter list including its parentheses.
    pub params: Vec<Token>,
    /// Result type or parenthesized result list.
    pub results: Vec<Token>,
    /// Raw source between the body braces.
    pub body: Option<String>,
    pub start: Pos,
    pub end: Pos,
}

impl ValueSpec {
    /// Base type name of the explicit type, if it is a local named type.
    pub fn type_name(&self) -> Option<String> {
        base_type_name(&self.ty)
    }

    /// The spec restricted to the names `visible` accepts, `None` when no
    /// name is left. A var whose values pair up with its names loses each
    /// hidden name together with its value. Otherwise hidden names become
    /// `_` when values or the implicit repetition of a const depend on their
    /// position, and are dropped from a typed spec without values.
    pub fn filter_names(&self, kind: GenKind, visible: impl Fn(&str) -> bool) -> Option<ValueSpec> {
        if !self.names.iter().any(|n| visible(n.as_str())) {
            return None;
        }
        if self.names.iter().all(|n| visible(n.as_str())) {
            return Some(self.clone());
        }

        let mut spec = self.clone();
        let values = split_top_level(&self.values, TokenKind::Comma);
        if kind == GenKind::Var && values.len() == self.names.len() {
            let (names, values): (Vec<String>, Vec<Vec<Token>>) = self
                .names
                .iter()
                .cloned()
                .zip(values)
                .filter(|(name, _)| visible(name.as_str()))
                .unzip();
            spec.names = names;
            spec.values = join_list(values);
        } else if !self.values.is_empty() || self.ty.is_empty() {
            for name in &mut spec.names {
                if !visible(name.as_str()) {
                    *name = "_".to_string();
                }
            }
        } else {
            spec.names.retain(|n| visible(n.as_str()));
        }
        Some(spec)
    }
}

impl TypeSpec {
    /// Drop the fields of a struct body or the methods of an interface body
    /// whose names `visible` rejects. Only the outermost body is filtered.
    /// Returns whether anything was removed.
    pub fn filter_members(&mut self, visible: impl Fn(&str) -> bool) -> bool {
        let Some((keyword, inner)) = type_body(&self.ty) else {
            return false;
        };
        let is_struct = keyword == "struct";
        let mut removed = false;
        let mut members = Vec::new();
        for member in split_top_level(inner, TokenKind::Semicolon) {
            let member: Vec<Token> = member
                .into_iter()
                .filter(|t| !t.kind.is_comment() && !t.implicit)
                .collect();
            if member.is_empty() {
                continue;
            }
            let kept = if is_struct {
                filter_field(&member, &visible)
            } else {
                filter_method(&member, &visible)
            };
            match kept {
                Some(kept) => {
                    removed |= kept.len() != member.len();
                    members.push(kept);
                }
                None => removed = true,
            }
        }
        if removed {
            self.filtered = Some(FilteredBody {
                keyword: keyword.to_string(),
                members,
            });
        }
        removed
    }
}

/// `struct { ... }` or `interface { ... }` spanning all of `ty`: the keyword
/// and the tokens between the braces.
fn type_body(ty: &[Token]) -> Option<(&str, &[Token])> {
    let [keyword, open, inner @ .., close] = ty else {
        return None;
    };
    if !keyword.is(TokenKind::Ident)
        || !matches!(keyword.text.as_str(), "struct" | "interface")
        || !open.is(TokenKind::LBrace)
        || !close.is(TokenKind::RBrace)
    {
        return None;
    }
    let mut depth = 0usize;
    for tok in inner {
        if tok.kind.is_open() {
            depth += 1;
        } else if tok.kind.is_close() {
            depth = depth.checked_sub(1)?;
        }
    }
    (depth == 0).then_some((keyword.text.as_str(), inner))
}

/// Struct field with hidden names removed; `None` when no name is left.
fn filter_field(field: &[Token], visible: &impl Fn(&str) -> bool) -> Option<Vec<Token>> {
    if let Some(name) = embedded_name(field) {
        return visible(name).then(|| field.to_vec());
    }

    let mut names = Vec::new();
    let mut i = 0;
    while let Some(tok) = field.get(i) {
        if !tok.is(TokenKind::Ident) {
            break;
        }
        names.push(tok);
        if field.get(i + 1).is_some_and(|t| t.is(TokenKind::Comma)) {
            i += 2;
        } else {
            i += 1;
            break;
        }
    }
    let kept: Vec<Vec<Token>> = names
        .iter()
        .filter(|t| visible(t.text.as_str()))
        .map(|t| vec![(*t).clone()])
        .collect();
    if kept.is_empty() {
        return None;
    }
    if kept.len() == names.len() {
        return Some(field.to_vec());
    }
    let mut out = join_list(kept);
    out.extend_from_slice(&field[i..]);
    Some(out)
}

/// Interface element, kept unless it is a hidden method or a hidden
/// embedded interface. Type unions are always kept.
fn filter_method(member: &[Token], visible: &impl Fn(&str) -> bool) -> Option<Vec<Token>> {
    let keep = match member {
        [name, open, ..] if name.is(TokenKind::Ident) && open.is(TokenKind::LParen) => {
            visible(name.text.as_str())
        }
        _ => match embedded_name(member) {
            Some(name) => visible(name) || is_predeclared(name),
            None => true,
        },
    };
    keep.then(|| member.to_vec())
}

/// Type name of an embedded element such as `T`, `*T`, `pkg.T` or `T[int]`,
/// optionally followed by a struct tag. `None` for named fields and methods.
fn embedded_name(tokens: &[Token]) -> Option<&str> {
    let mut rest = tokens;
    if let [head @ .., last] = rest {
        if matches!(last.kind, TokenKind::String | TokenKind::RawString) {
            rest = head;
        }
    }
    if rest.first().is_some_and(|t| t.is(TokenKind::Star)) {
        rest = &rest[1..];
    }
    let (name, tail) = match rest {
        [pkg, dot, name, tail @ ..]
            if pkg.is(TokenKind::Ident) && dot.is(TokenKind::Dot) && name.is(TokenKind::Ident) =>
        {
            (name, tail)
        }
        [name, tail @ ..] if name.is(TokenKind::Ident) => (name, tail),
        _ => return None,
    };
    let embedded = match tail {
        [] => true,
        [open, ..] if open.is(TokenKind::LBracket) => closing_index(tail) == Some(tail.len() - 1),
        _ => false,
    };
    embedded.then_some(name.text.as_str())
}

/// Index of the bracket closing `tokens[0]`.
fn closing_index(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind.is_open() {
            depth += 1;
        } else if tok.kind.is_close() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn is_predeclared(name: &str) -> bool {
    matches!(
        name,
        "any" | "bool" | "byte" | "comparable" | "complex64" | "complex128" | "error"
            | "float32" | "float64" | "int" | "int8" | "int16" | "int32" | "int64"
            | "rune" | "string" | "uint" | "uint8" | "uint16" | "uint32" | "uint64"
            | "uintptr"
    )
}

/// Join list elements with commas placed right after each element.
fn join_list(parts: Vec<Vec<Token>>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::new();
    for part in parts {
        if let Some(prev) = out.last() {
            let comma = Token {
                kind: TokenKind::Comma,
                text: ",".to_string(),
                start: prev.end,
                end: prev.end,
                offset: (prev.offset.1, prev.offset.1),
                spaced: false,
                implicit: false,
            };
            out.push(comma);
        }
        out.extend(part);
    }
    out
}

impl FuncDecl {
    /// Base type name of the receiver, e.g. `T` for `(t *T)` or `(s Set[K])`.
    pub fn recv_type(&self) -> Option<String> {
        let recv = self.recv.as_ref()?;
        // drop the receiver name when one is present
        let ty = match recv.as_slice() {
            [first, second, ..]
                if first.is(TokenKind::Ident)
                    && !second.is(TokenKind::Dot)
                    && !second.is(TokenKind::LBracket) =>
            {
                &recv[1..]
            }
            _ => &recv[..],
        };
        base_type_name(ty)
    }

    /// Result types split on top-level commas, with any names removed.
    pub fn result_types(&self) -> Vec<Vec<Token>> {
        let inner = match self.results.as_slice() {
            [first, .., last] if first.is(TokenKind::LParen) && last.is(TokenKind::RParen) => {
                &self.results[1..self.results.len() - 1]
            }
            _ => &self.results[..],
        };
        let mut types = Vec::new();
        for field in split_top_level(inner, TokenKind::Comma) {
            // `err error` -> `error`; a lone identifier is a type
            let named = matches!(
                field.as_slice(),
                [name, next, ..]
                    if name.is(TokenKind::Ident)
                        && !next.is(TokenKind::Dot)
                        && !next.is(TokenKind::LBracket)
            );
            let ty = if named { field[1..].to_vec() } else { field };
            if !ty.is_empty() {
                types.push(ty);
            }
        }
        types
    }

    /// One-line signature, e.g. `func (t *T) Name(a int) error`.
    pub fn signature(&self) -> String {
        self.to_string().lines().map(str::trim).collect::<Vec<_>>().join(" ")
    }
}

/// Name of the named type behind pointers, slices and arrays, when the type is
/// declared in the current package (qualified names return `None`).
pub fn base_type_name(tokens: &[Token]) -> Option<String> {
    let mut rest = tokens;
    loop {
        match rest {
            [star, tail @ ..] if star.is(TokenKind::Star) => rest = tail,
            [open, tail @ ..] if open.is(TokenKind::LBracket) => {
                let close = tail.iter().position(|t| t.is(TokenKind::RBracket))?;
                rest = &tail[close + 1..];
            }
            [ident] if is_type_ident(ident) => return Some(ident.text.clone()),
            [ident, open, ..] if is_type_ident(ident) && open.is(TokenKind::LBracket) => {
                return Some(ident.text.clone())
            }
            _ => return None,
        }
    }
}

fn is_type_ident(token: &Token) -> bool {
    token.is(TokenKind::Ident) && !matches!(token.text.as_str(), "map" | "chan" | "struct" | "interface")
}

/// Split a token run on `sep` at bracket depth zero.
pub fn split_top_level(tokens: &[Token], sep: TokenKind) -> Vec<Vec<Token>> {
    let mut parts = vec![Vec::new()];
    let mut depth = 0usize;
    for tok in tokens {
        if tok.kind.is_open() {
            depth += 1;
        } else if tok.kind.is_close() {
            depth = depth.saturating_sub(1);
        }
        if depth == 0 && tok.kind == sep {
            parts.push(Vec::new());
            continue;
        }
        if let Some(last) = parts.last_mut() {
            last.push(tok.clone());
        }
    }
    parts.retain(|p| !p.is_empty());
    parts
}

// -- Printing -----------------------------------------------------------------

/// Print a token run. Line breaks from the source are kept; indentation is
/// `indent` tabs plus the bracket depth at the start of each line.
pub fn print_tokens(tokens: &[Token], indent: usize) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut prev: Option<&Token> = None;

    for tok in tokens.iter().filter(|t| !t.implicit && !t.kind.is_comment()) {
        if tok.kind.is_close() {
            depth = depth.saturating_sub(1);
        }
        if let Some(p) = prev {
            if tok.start.line > p.end.line {
                out.push('\n');
                out.push_str(&"\t".repeat(indent + depth));
            } else if needs_space(p, tok) {
                out.push(' ');
            }
        }
        out.push_str(&tok.text);
        if tok.kind.is_open() {
            depth += 1;
        }
        prev = Some(tok);
    }
    out
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    use TokenKind::*;
    match (prev.kind, next.kind) {
        (_, Comma | Semicolon | RParen | RBracket | Dot) => false,
        (LParen | LBracket | Dot | Ellipsis, _) => false,
        (LBrace, RBrace) => false,
        (Comma | Semicolon | Colon, _) => true,
        (_, Assign) | (Assign, _) => true,
        (_, Colon) => false,
        (RParen, Ident | Star | LBracket | Func) => true,
        _ => next.spaced,
    }
}

impl fmt::Display for ValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}

impl ValueSpec {
    fn write(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{}", self.names.join(", "))?;
        if !self.ty.is_empty() {
            write!(f, " {}", print_tokens(&self.ty, indent))?;
        }
        if !self.values.is_empty() {
            write!(f, " = {}", print_tokens(&self.values, indent))?;
        }
        Ok(())
    }
}

impl TypeSpec {
    fn write(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{}{}", self.name, print_tokens(&self.type_params, indent))?;
        if self.alias {
            write!(f, " =")?;
        }
        match &self.filtered {
            Some(body) => {
                write!(f, " ")?;
                body.write(f, indent)
            }
            None => write!(f, " {}", print_tokens(&self.ty, indent)),
        }
    }
}

impl FilteredBody {
    fn write(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let inner = "\t".repeat(indent + 1);
        write!(f, "{} {{", self.keyword)?;
        for member in &self.members {
            write!(f, "\n{inner}{}", print_tokens(member, indent + 1))?;
        }
        let what = if self.keyword == "struct" { "fields" } else { "methods" };
        write!(
            f,
            "\n{inner}// contains filtered or unexported {what}\n{}}}",
            "\t".repeat(indent)
        )
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}

impl Spec {
    fn write(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Spec::Value(v) => v.write(f, indent),
            Spec::Type(t) => t.write(f, indent),
        }
    }
}

impl fmt::Display for GenDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = self.kind.keyword();
        if !self.grouped {
            write!(f, "{keyword} ")?;
            return match self.specs.first() {
                Some(spec) => spec.write(f, 0),
                None => Ok(()),
            };
        }
        if self.specs.is_empty() {
            return write!(f, "{keyword} ()");
        }
        writeln!(f, "{keyword} (")?;
        for spec in &self.specs {
            write!(f, "\t")?;
            spec.write(f, 1)?;
            writeln!(f)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for FuncDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func ")?;
        if let Some(recv) = &self.recv {
            write!(f, "({}) ", print_tokens(recv, 0))?;
        }
        write!(
            f,
            "{}{}{}",
            self.name,
            print_tokens(&self.type_params, 0),
            print_tokens(&self.params, 0)
        )?;
        if !self.results.is_empty() {
            write!(f, " {}", print_tokens(&self.results, 0))?;
        }
        Ok(())
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Gen(g) => g.fmt(f),
            Decl::Func(func) => func.fmt(f),
        }
    }
}
