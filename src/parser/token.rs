//! Go lexer: logos token definitions plus line/column tracking and
//! automatic semicolon insertion.

use logos::Logos;
use std::fmt;

/// The kind of a lexed Go token.
///
/// Only the keywords that start a top-level declaration get their own
/// variant; every other keyword lexes as `Ident`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("type")]
    Type,
    #[token("func")]
    Func,

    #[regex(r"[\p{L}_][\p{L}\p{N}_]*", priority = 3)]
    Ident,
    #[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9a-zA-Z_]*)?")]
    #[regex(r"\.[0-9][0-9a-zA-Z_]*")]
    Number,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,
    #[regex(r"`[^`]*`")]
    RawString,
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Rune,

    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("=")]
    Assign,
    #[token("*")]
    Star,
    #[token(":")]
    Colon,
    #[token("++")]
    #[token("--")]
    IncDec,
    #[token("+")]
    #[token("-")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("<")]
    #[token(">")]
    #[token("!")]
    #[token("~")]
    #[token("<<")]
    #[token(">>")]
    #[token("&^")]
    #[token("&&")]
    #[token("||")]
    #[token("<-")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token(":=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("&^=")]
    Operator,

    #[token("\n")]
    Newline,

    /// Character the lexer does not recognise (kept so positions stay exact).
    Unknown,
}

impl TokenKind {
    /// Opening bracket of any kind.
    pub fn is_open(self) -> bool {
        matches!(self, Self::LParen | Self::LBrace | Self::LBracket)
    }

    /// Closing bracket of any kind.
    pub fn is_close(self) -> bool {
        matches!(self, Self::RParen | Self::RBrace | Self::RBracket)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }
}

/// 1-based line and byte column inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A lexed token with its text and exclusive end position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Pos,
    pub end: Pos,
    /// Byte offset range in the source.
    pub offset: (usize, usize),
    /// Whether blanks separated this token from the previous one on the same line.
    pub spaced: bool,
    /// Inserted by the semicolon rule rather than written in the source.
    pub implicit: bool,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    pub fn position(&self, offset: usize) -> Pos {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        Pos {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }
}

/// Lex `source` into tokens, comments included, newlines replaced by Go's
/// automatic semicolons.
pub fn tokenize(source: &str) -> Vec<Token> {
    let index = LineIndex::new(source);
    let mut lexer = TokenKind::lexer(source);
    let mut tokens: Vec<Token> = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.unwrap_or(TokenKind::Unknown);

        if kind == TokenKind::Newline {
            if let Some(last) = tokens.iter().rev().find(|t| !t.kind.is_comment()) {
                if ends_statement(last) && last.end.line == index.position(span.start).line {
                    let at = index.position(span.start);
                    tokens.push(implicit_semicolon(at, span.start));
                }
            }
            continue;
        }

        let spaced = span.start > 0
            && matches!(source.as_bytes()[span.start - 1], b' ' | b'\t' | b'\r' | b'\x0c');
        tokens.push(Token {
            kind,
            text: lexer.slice().to_string(),
            start: index.position(span.start),
            end: index.position(span.end),
            offset: (span.start, span.end),
            spaced,
            implicit: false,
        });
    }

    if let Some(last) = tokens.iter().rev().find(|t| !t.kind.is_comment()) {
        if ends_statement(last) {
            tokens.push(implicit_semicolon(last.end, source.len()));
        }
    }

    tokens
}

fn implicit_semicolon(at: Pos, offset: usize) -> Token {
    Token {
        kind: TokenKind::Semicolon,
        text: ";".to_string(),
        start: at,
        end: at,
        offset: (offset, offset),
        spaced: false,
        implicit: true,
    }
}

/// Go inserts a semicolon after a line's final token when it is one of these.
fn ends_statement(token: &Token) -> bool {
    match token.kind {
        TokenKind::Ident
        | TokenKind::Number
        | TokenKind::String
        | TokenKind::RawString
        | TokenKind::Rune
        | TokenKind::RParen
        | TokenKind::RBracket
        | TokenKind::RBrace
        | TokenKind::IncDec => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_idents() {
        assert_eq!(
            kinds("var funcs = func"),
            vec![
                TokenKind::Var,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Func,
            ]
        );
    }

    #[test]
    fn semicolon_inserted_after_line_end() {
        let tokens = tokenize("var A = 1\nvar B = 2\n");
        let semis: Vec<_> = tokens.iter().filter(|t| t.implicit).collect();
        assert_eq!(semis.len(), 2);
        assert_eq!(semis[0].start, Pos::new(1, 10));
    }

    #[test]
    fn no_semicolon_after_open_paren() {
        let tokens = tokenize("var (\n\tA = 1\n)\n");
        assert!(!tokens[2].implicit);
        assert_eq!(tokens[2].text, "A");
    }

    #[test]
    fn positions_are_one_based_with_exclusive_end() {
        let tokens = tokenize("package p\n\nvar Variable = 5\n");
        let five = tokens.iter().find(|t| t.text == "5").unwrap();
        assert_eq!(five.start, Pos::new(3, 16));
        assert_eq!(five.end, Pos::new(3, 17));
    }

    #[test]
    fn comments_and_strings() {
        let tokens = tokenize("// doc\nvar s = `a\nb` /* c */\n");
        assert_eq!(tokens[0].kind, TokenKind::LineComment);
        let raw = tokens.iter().find(|t| t.kind == TokenKind::RawString).unwrap();
        assert_eq!(raw.end, Pos::new(3, 3));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::BlockComment));
        // semicolon goes after the raw string even with a trailing comment
        assert!(tokens.last().unwrap().implicit);
    }

    #[test]
    fn spacing_is_recorded() {
        let tokens = tokenize("x  *T");
        assert!(tokens[1].spaced);
        assert!(!tokens[2].spaced);
    }

    #[test]
    fn multi_char_operators() {
        let tokens = tokenize("a := <-ch");
        assert!(tokens[1].is_op(":="));
        assert!(tokens[2].is_op("<-"));
    }
}
