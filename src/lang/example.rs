//! Testable examples from `_test.go` files.

use super::{doc, Entity, LangError, Location, Scope};
use crate::parser::ast::FuncDecl;
use std::path::Path;

/// An `Example*` function from a test file.
#[derive(Debug, Clone)]
pub struct Example {
    name: String,
    title: String,
    target: String,
    doc: String,
    code: String,
    output: Option<String>,
    level: usize,
    location: Location,
}

impl Example {
    /// `suffix` is the part after the target name, `target` the documented
    /// symbol as written in prose (`Point.Scale`, `demo`).
    pub(crate) fn new(decl: &FuncDecl, suffix: &str, target: &str, file: &Path, scope: &Scope) -> Self {
        let (code, output) = split_output(decl.body.as_deref().unwrap_or(""));
        Self {
            name: decl.name.clone(),
            title: title(suffix),
            target: target.to_string(),
            doc: decl.doc.clone().unwrap_or_default(),
            code,
            output,
            level: scope.level,
            location: scope.location(decl.start, decl.end, file),
        }
    }

    /// `Example` or the suffix with a capitalised first letter.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body of the example function, dedented, output comment removed.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Expected output from the trailing `// Output:` comment.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

impl Entity for Example {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> usize {
        self.level
    }

    fn summary(&self) -> String {
        doc::summary(&self.doc)
            .unwrap_or_else(|| format!("{} demonstrates usage of {}.", self.title, self.target))
    }

    fn doc(&self) -> &str {
        &self.doc
    }

    fn decl(&self) -> Result<String, LangError> {
        Err(LangError::DeclUnavailable {
            kind: "example",
            name: self.name.clone(),
        })
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

fn title(suffix: &str) -> String {
    let mut chars = suffix.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().replace('_', " ");
            format!("{}{rest}", first.to_uppercase())
        }
        None => "Example".to_string(),
    }
}

/// Split a body into code and the text of its `// Output:` comment.
fn split_output(body: &str) -> (String, Option<String>) {
    let lines: Vec<&str> = body.lines().collect();
    let marker = lines.iter().rposition(|l| {
        let l = l.trim_start();
        l.starts_with("// Output:") || l.starts_with("// Unordered output:")
    });

    let (code_lines, output) = match marker {
        Some(at) => {
            let first = lines[at]
                .split_once(':')
                .map_or("", |(_, rest)| rest.trim());
            let mut out: Vec<&str> = Vec::new();
            if !first.is_empty() {
                out.push(first);
            }
            for line in &lines[at + 1..] {
                let line = line.trim_start();
                match line.strip_prefix("//") {
                    Some(text) => out.push(text.strip_prefix(' ').unwrap_or(text)),
                    None if line.is_empty() => {}
                    None => break,
                }
            }
            (&lines[..at], Some(out.join("\n")))
        }
        None => (&lines[..], None),
    };

    let start = code_lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(code_lines.len());
    let end = code_lines.iter().rposition(|l| !l.trim().is_empty()).map_or(start, |i| i + 1);
    (doc::dedent(&code_lines[start..end]), output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles() {
        assert_eq!(title(""), "Example");
        assert_eq!(title("basic"), "Basic");
        assert_eq!(title("with_options"), "With options");
    }

    #[test]
    fn output_is_split_from_code() {
        let body = "\n\tfmt.Println(Add(1, 2))\n\t// Output: 3\n";
        let (code, output) = split_output(body);
        assert_eq!(code, "fmt.Println(Add(1, 2))");
        assert_eq!(output.as_deref(), Some("3"));
    }

    #[test]
    fn multi_line_output() {
        let body = "\n\tfor i := 0; i < 2; i++ {\n\t\tfmt.Println(i)\n\t}\n\t// Output:\n\t// 0\n\t// 1\n";
        let (code, output) = split_output(body);
        assert_eq!(code, "for i := 0; i < 2; i++ {\n\tfmt.Println(i)\n}");
        assert_eq!(output.as_deref(), Some("0\n1"));
    }

    #[test]
    fn no_output() {
        let (code, output) = split_output("\n\tRun()\n");
        assert_eq!(code, "Run()");
        assert_eq!(output, None);
    }
}
