//! Top-level Go declaration parser.
//!
//! Works on the token stream from [`super::token`]: it understands package
//! clauses, imports, `var`/`const`/`type` declarations (single or grouped)
//! and function signatures. Function bodies are kept as raw text and never
//! parsed.

use super::ast::*;
use super::token::{tokenize, Pos, Token, TokenKind};
use super::ParseError;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `//go:generate`, `//lint:ignore` and friends are not documentation.
static RE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(line |extern |export |[a-z0-9]+:[a-z0-9])").unwrap());

/// A parsed Go source file.
#[derive(Debug, Clone)]
pub struct File {
    pub path: PathBuf,
    pub package: String,
    /// Comment group directly above the package clause.
    pub doc: Option<String>,
    pub package_start: Pos,
    pub package_end: Pos,
    pub decls: Vec<Decl>,
}

/// Parse one Go source file.
pub fn parse_file(path: &Path, source: &str) -> Result<File, ParseError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let all = tokenize(source);
    let comments = comment_groups(&all);
    let tokens: Vec<Token> = all.into_iter().filter(|t| !t.kind.is_comment()).collect();

    let mut parser = Parser {
        path,
        source,
        tokens,
        comments,
        pos: 0,
    };
    parser.file()
}

struct Parser<'a> {
    path: &'a Path,
    source: &'a str,
    tokens: Vec<Token>,
    /// Lead comment groups keyed by the line they end on.
    comments: BTreeMap<usize, String>,
    pos: usize,
}

impl Parser<'_> {
    fn file(&mut self) -> Result<File, ParseError> {
        while self.peek_is(TokenKind::Semicolon) {
            self.pos += 1;
        }
        let clause = self.expect(TokenKind::Package, "package clause")?;
        let name = self.expect(TokenKind::Ident, "package name")?;
        let doc = self.doc_for(clause.start.line);

        let mut decls = Vec::new();
        while let Some(tok) = self.peek().cloned() {
            match tok.kind {
                TokenKind::Semicolon => self.pos += 1,
                TokenKind::Import => {
                    self.pos += 1;
                    self.skip_import()?;
                }
                TokenKind::Var | TokenKind::Const | TokenKind::Type => {
                    decls.push(Decl::Gen(self.gen_decl()?));
                }
                TokenKind::Func => decls.push(Decl::Func(self.func_decl()?)),
                _ => {
                    return Err(self.error(tok.start, format!("unexpected `{}` at top level", tok.text)));
                }
            }
        }

        Ok(File {
            path: self.path.to_path_buf(),
            package: name.text,
            doc,
            package_start: clause.start,
            package_end: name.end,
            decls,
        })
    }

    // -- Declarations ---------------------------------------------------------

    fn skip_import(&mut self) -> Result<(), ParseError> {
        if self.peek_is(TokenKind::LParen) {
            self.bracketed()?;
        } else {
            self.spec_tokens()?;
        }
        Ok(())
    }

    fn gen_decl(&mut self) -> Result<GenDecl, ParseError> {
        let keyword = self.advance()?;
        let kind = match keyword.kind {
            TokenKind::Var => GenKind::Var,
            TokenKind::Const => GenKind::Const,
            _ => GenKind::Type,
        };
        let doc = self.doc_for(keyword.start.line);

        if !self.peek_is(TokenKind::LParen) {
            let tokens = self.spec_tokens()?;
            let spec = self.spec(kind, tokens, keyword.start)?;
            let end = spec_end(&spec);
            return Ok(GenDecl {
                kind,
                doc,
                grouped: false,
                specs: vec![spec],
                start: keyword.start,
                end,
            });
        }

        self.pos += 1;
        let mut specs = Vec::new();
        let end = loop {
            match self.peek().map(|t| t.kind) {
                None => return Err(self.error(keyword.start, "unclosed declaration group")),
                Some(TokenKind::RParen) => break self.advance()?.end,
                Some(TokenKind::Semicolon) => self.pos += 1,
                Some(_) => {
                    let tokens = self.spec_tokens()?;
                    let start = tokens[0].start;
                    specs.push(self.spec(kind, tokens, start)?);
                }
            }
        };

        Ok(GenDecl {
            kind,
            doc,
            grouped: true,
            specs,
            start: keyword.start,
            end,
        })
    }

    /// Build a spec from its tokens. `start` is where the spec's span begins.
    fn spec(&self, kind: GenKind, tokens: Vec<Token>, start: Pos) -> Result<Spec, ParseError> {
        let doc = self.doc_for(tokens[0].start.line);
        let end = tokens.last().map_or(start, |t| t.end);

        if kind == GenKind::Type {
            let (name, rest) = match tokens.split_first() {
                Some((name, rest)) if name.is(TokenKind::Ident) => (name.text.clone(), rest),
                _ => return Err(self.error(tokens[0].start, "expected type name")),
            };
            let mut rest = rest;
            let mut type_params = Vec::new();
            if is_type_params(rest) {
                let close = matching_close(rest)
                    .ok_or_else(|| self.error(rest[0].start, "unclosed type parameter list"))?;
                type_params = rest[..=close].to_vec();
                rest = &rest[close + 1..];
            }
            let alias = rest.first().is_some_and(|t| t.is(TokenKind::Assign));
            if alias {
                rest = &rest[1..];
            }
            if rest.is_empty() {
                return Err(self.error(tokens[0].start, format!("missing type for `{name}`")));
            }
            return Ok(Spec::Type(TypeSpec {
                doc,
                name,
                type_params,
                alias,
                ty: rest.to_vec(),
                filtered: None,
                start,
                end,
            }));
        }

        let mut names = Vec::new();
        let mut i = 0;
        while let Some(tok) = tokens.get(i) {
            if !tok.is(TokenKind::Ident) {
                return Err(self.error(tok.start, format!("expected identifier, found `{}`", tok.text)));
            }
            names.push(tok.text.clone());
            i += 1;
            if tokens.get(i).is_some_and(|t| t.is(TokenKind::Comma)) {
                i += 1;
            } else {
                break;
            }
        }

        let rest = &tokens[i..];
        let assign = top_level_position(rest, TokenKind::Assign);
        let (ty, values) = match assign {
            Some(at) => (rest[..at].to_vec(), rest[at + 1..].to_vec()),
            None => (rest.to_vec(), Vec::new()),
        };

        Ok(Spec::Value(ValueSpec {
            doc,
            names,
            ty,
            values,
            start,
            end,
        }))
    }

    fn func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let keyword = self.advance()?;
        let doc = self.doc_for(keyword.start.line);

        let recv = if self.peek_is(TokenKind::LParen) {
            let tokens = self.bracketed()?;
            Some(tokens[1..tokens.len() - 1].to_vec())
        } else {
            None
        };

        let name = self.expect(TokenKind::Ident, "function name")?;
        let type_params = if self.peek_is(TokenKind::LBracket) {
            self.bracketed()?
        } else {
            Vec::new()
        };
        if !self.peek_is(TokenKind::LParen) {
            return Err(self.error(name.end, "expected parameter list"));
        }
        let params = self.bracketed()?;
        let mut end = params.last().map_or(name.end, |t| t.end);

        let mut results = Vec::new();
        if self.peek_is(TokenKind::LParen) {
            results = self.bracketed()?;
        } else {
            while let Some(tok) = self.peek() {
                match tok.kind {
                    TokenKind::Semicolon => break,
                    TokenKind::LBrace if !results.last().is_some_and(opens_type_body) => break,
                    k if k.is_open() => results.extend(self.bracketed()?),
                    _ => results.push(self.advance()?),
                }
            }
        }
        if let Some(last) = results.last() {
            end = last.end;
        }

        let body = if self.peek_is(TokenKind::LBrace) {
            let block = self.bracketed()?;
            let open = block[0].offset.1;
            let close = block[block.len() - 1].offset.0;
            Some(self.source[open..close].to_string())
        } else {
            None
        };

        Ok(FuncDecl {
            doc,
            recv,
            name: name.text,
            type_params,
            params,
            results,
            body,
            start: keyword.start,
            end,
        })
    }

    // -- Token helpers --------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.is(kind))
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.error(self.last_pos(), "unexpected end of file"))?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(tok) if tok.is(kind) => self.advance(),
            Some(tok) => Err(self.error(tok.start, format!("expected {what}, found `{}`", tok.text))),
            None => Err(self.error(self.last_pos(), format!("expected {what}, found end of file"))),
        }
    }

    /// Consume a bracket group starting at the current token, brackets included.
    fn bracketed(&mut self) -> Result<Vec<Token>, ParseError> {
        let open = self.advance()?;
        let mut depth = 1usize;
        let mut out = vec![open.clone()];
        while depth > 0 {
            let tok = self
                .tokens
                .get(self.pos)
                .cloned()
                .ok_or_else(|| self.error(open.start, format!("unclosed `{}`", open.text)))?;
            self.pos += 1;
            if tok.kind.is_open() {
                depth += 1;
            } else if tok.kind.is_close() {
                depth -= 1;
            }
            out.push(tok);
        }
        Ok(out)
    }

    /// Tokens of one spec: up to a top-level `;` (consumed) or a group's `)`
    /// (left in place).
    fn spec_tokens(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut out = Vec::new();
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Semicolon => {
                    self.pos += 1;
                    break;
                }
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => break,
                k if k.is_open() => out.extend(self.bracketed()?),
                _ => out.push(self.advance()?),
            }
        }
        if out.is_empty() {
            let at = self.peek().map_or(self.last_pos(), |t| t.start);
            return Err(self.error(at, "empty declaration"));
        }
        Ok(out)
    }

    fn doc_for(&self, line: usize) -> Option<String> {
        let text = self.comments.get(&line.checked_sub(1)?)?;
        if text.is_empty() {
            None
        } else {
            Some(text.clone())
        }
    }

    fn last_pos(&self) -> Pos {
        self.tokens.last().map_or(Pos::new(1, 1), |t| t.end)
    }

    fn error(&self, pos: Pos, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            path: self.path.to_path_buf(),
            pos,
            message: message.into(),
        }
    }
}

fn spec_end(spec: &Spec) -> Pos {
    match spec {
        Spec::Value(v) => v.end,
        Spec::Type(t) => t.end,
    }
}

/// `struct {` and `interface {` open a type body, not a function body.
fn opens_type_body(tok: &Token) -> bool {
    tok.is(TokenKind::Ident) && matches!(tok.text.as_str(), "struct" | "interface")
}

/// Distinguish `T[P any]` (type parameters) from `T [N]int` (array type).
fn is_type_params(tokens: &[Token]) -> bool {
    match tokens {
        [open, param, next, ..] if open.is(TokenKind::LBracket) && param.is(TokenKind::Ident) => {
            match next.kind {
                TokenKind::RBracket | TokenKind::Dot | TokenKind::Star => false,
                TokenKind::Operator => next.text == "~",
                _ => true,
            }
        }
        _ => false,
    }
}

/// Index of the bracket closing `tokens[0]`.
fn matching_close(tokens: &[Token]) -> Option<usize> {
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

fn top_level_position(tokens: &[Token], kind: TokenKind) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind.is_open() {
            depth += 1;
        } else if tok.kind.is_close() {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && tok.kind == kind {
            return Some(i);
        }
    }
    None
}

// -- Comments -----------------------------------------------------------------

/// Group comments that sit on their own lines into lead comment groups,
/// keyed by the line each group ends on.
fn comment_groups(tokens: &[Token]) -> BTreeMap<usize, String> {
    let mut groups = BTreeMap::new();
    let mut current: Vec<&Token> = Vec::new();
    let mut last_code_line = 0usize;

    for tok in tokens.iter().filter(|t| !t.implicit) {
        if !tok.kind.is_comment() {
            flush_group(&mut groups, &mut current);
            last_code_line = tok.end.line;
            continue;
        }
        if tok.start.line == last_code_line {
            // trailing comment on a code line
            flush_group(&mut groups, &mut current);
            continue;
        }
        if let Some(prev) = current.last() {
            if tok.start.line > prev.end.line + 1 {
                flush_group(&mut groups, &mut current);
            }
        }
        current.push(tok);
    }
    flush_group(&mut groups, &mut current);
    groups
}

fn flush_group(groups: &mut BTreeMap<usize, String>, current: &mut Vec<&Token>) {
    if let Some(last) = current.last() {
        groups.insert(last.end.line, comment_text(current));
    }
    current.clear();
}

/// Comment text with markers, directives and surrounding blank lines removed.
pub fn comment_text(comments: &[&Token]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for comment in comments {
        if let Some(rest) = comment.text.strip_prefix("//") {
            if RE_DIRECTIVE.is_match(rest) {
                continue;
            }
            lines.push(rest.strip_prefix(' ').unwrap_or(rest).trim_end().to_string());
        } else {
            let inner = comment
                .text
                .strip_prefix("/*")
                .and_then(|s| s.strip_suffix("*/"))
                .unwrap_or(&comment.text);
            lines.extend(inner.lines().map(|l| l.trim_end().to_string()));
        }
    }

    let mut out: Vec<String> = Vec::new();
    for line in lines {
        if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> File {
        parse_file(Path::new("/work/test.go"), source).unwrap()
    }

    fn gen(decl: &Decl) -> &GenDecl {
        match decl {
            Decl::Gen(g) => g,
            Decl::Func(_) => panic!("expected general declaration"),
        }
    }

    fn func(decl: &Decl) -> &FuncDecl {
        match decl {
            Decl::Func(f) => f,
            Decl::Gen(_) => panic!("expected function declaration"),
        }
    }

    #[test]
    fn package_clause_and_doc() {
        let file = parse("// Package demo does things.\npackage demo\n");
        assert_eq!(file.package, "demo");
        assert_eq!(file.doc.as_deref(), Some("Package demo does things."));
        assert_eq!(file.package_start, Pos::new(2, 1));
    }

    #[test]
    fn missing_package_clause_fails() {
        let err = parse_file(Path::new("x.go"), "var A = 1\n").unwrap_err();
        assert!(err.to_string().contains("expected package clause"));
    }

    #[test]
    fn single_var_span() {
        let file = parse("package p\n\n\nvar Variable = 5\n");
        let decl = gen(&file.decls[0]);
        assert_eq!(decl.start, Pos::new(4, 1));
        assert_eq!(decl.end, Pos::new(4, 17));
        assert_eq!(decl.to_string(), "var Variable = 5");
        assert!(decl.doc.is_none());
    }

    #[test]
    fn imports_are_skipped() {
        let file = parse("package p\n\nimport (\n\t\"fmt\"\n\tio \"io\"\n)\nimport \"os\"\n\nconst A = 1\n");
        assert_eq!(file.decls.len(), 1);
    }

    #[test]
    fn grouped_values_with_docs() {
        let src = "package p\n\n// Colors.\nconst (\n\t// Red is red.\n\tRed Color = iota\n\tGreen\n)\n";
        let file = parse(src);
        let decl = gen(&file.decls[0]);
        assert!(decl.grouped);
        assert_eq!(decl.doc.as_deref(), Some("Colors."));
        assert_eq!(decl.specs.len(), 2);
        match &decl.specs[0] {
            Spec::Value(v) => {
                assert_eq!(v.doc.as_deref(), Some("Red is red."));
                assert_eq!(v.type_name().as_deref(), Some("Color"));
            }
            Spec::Type(_) => panic!("expected value spec"),
        }
        assert_eq!(decl.to_string(), "const (\n\tRed Color = iota\n\tGreen\n)");
        assert_eq!(decl.end, Pos::new(8, 2));
    }

    #[test]
    fn multi_name_values() {
        let file = parse("package p\nvar a, b   int = 1,2\n");
        assert_eq!(gen(&file.decls[0]).to_string(), "var a, b int = 1, 2");
    }

    #[test]
    fn struct_type() {
        let src = "package p\n\n// Point is a point.\ntype Point struct {\n    X, Y int // coords\n}\n";
        let file = parse(src);
        let decl = gen(&file.decls[0]);
        assert_eq!(decl.to_string(), "type Point struct {\n\tX, Y int\n}");
        assert_eq!(decl.doc.as_deref(), Some("Point is a point."));
    }

    #[test]
    fn generic_type_and_array_type() {
        let file = parse("package p\ntype Set[K comparable] map[K]struct{}\ntype Buf [16]byte\n");
        match &gen(&file.decls[0]).specs[0] {
            Spec::Type(t) => assert_eq!(t.type_params.len(), 4),
            Spec::Value(_) => panic!("expected type spec"),
        }
        match &gen(&file.decls[1]).specs[0] {
            Spec::Type(t) => assert!(t.type_params.is_empty()),
            Spec::Value(_) => panic!("expected type spec"),
        }
        assert_eq!(gen(&file.decls[0]).to_string(), "type Set[K comparable] map[K]struct{}");
    }

    #[test]
    fn type_alias() {
        let file = parse("package p\ntype Alias = string\n");
        assert_eq!(gen(&file.decls[0]).to_string(), "type Alias = string");
    }

    #[test]
    fn function_signature_and_body() {
        let src = "package p\n\n// Add adds.\nfunc Add(a, b int) int {\n\treturn a + b\n}\n";
        let file = parse(src);
        let f = func(&file.decls[0]);
        assert_eq!(f.name, "Add");
        assert_eq!(f.doc.as_deref(), Some("Add adds."));
        assert_eq!(f.to_string(), "func Add(a, b int) int");
        assert_eq!(f.start, Pos::new(4, 1));
        assert_eq!(f.end, Pos::new(4, 23));
        assert_eq!(f.body.as_deref(), Some("\n\treturn a + b\n"));
    }

    #[test]
    fn method_with_receiver_and_results() {
        let file = parse("package p\nfunc (p *Point) Scale(f float64) (*Point, error) { return nil, nil }\n");
        let f = func(&file.decls[0]);
        assert_eq!(f.recv_type().as_deref(), Some("Point"));
        assert_eq!(f.to_string(), "func (p *Point) Scale(f float64) (*Point, error)");
        assert_eq!(f.result_types().len(), 2);
    }

    #[test]
    fn interface_result_is_not_a_body() {
        let file = parse("package p\nfunc Any() interface{} { return nil }\n");
        let f = func(&file.decls[0]);
        assert_eq!(f.to_string(), "func Any() interface{}");
        assert_eq!(f.body.as_deref(), Some(" return nil "));
    }

    #[test]
    fn trailing_comment_is_not_a_doc() {
        let file = parse("package p\nvar A = 1 // one\nvar B = 2\n");
        assert!(gen(&file.decls[1]).doc.is_none());
    }

    #[test]
    fn directives_are_not_docs() {
        let file = parse("package p\n\n//go:generate stringer\n// Kind is a kind.\ntype Kind int\n");
        assert_eq!(gen(&file.decls[0]).doc.as_deref(), Some("Kind is a kind."));
    }

    #[test]
    fn block_comment_doc() {
        let file = parse("package p\n\n/*\nLong explains.\n*/\nvar Long = 1\n");
        assert_eq!(gen(&file.decls[0]).doc.as_deref(), Some("Long explains."));
    }

    #[test]
    fn unclosed_group_fails() {
        let err = parse_file(Path::new("bad.go"), "package p\nvar (\n\tA = 1\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn func_literal_value() {
        let src = "package p\nvar Handler = func(x int) int {\n\treturn x\n}\n";
        let file = parse(src);
        assert_eq!(
            gen(&file.decls[0]).to_string(),
            "var Handler = func(x int) int {\n\treturn x\n}"
        );
    }
}
