//! Doc comment text: summaries and block structure.

/// A block of a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    /// Indented lines, dedented.
    Code(String),
    /// A single-line `# Heading` paragraph.
    Heading(String),
}

/// First sentence of the first paragraph, whitespace collapsed.
///
/// The sentence ends at the first `.` followed by whitespace or the end of
/// the text. Abbreviations are not recognised, so `e.g. this` ends at `e.g.`.
/// Returns `None` for empty text.
pub fn summary(text: &str) -> Option<String> {
    let paragraph = text
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())?;
    let collapsed = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");

    let bytes = collapsed.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'.' && bytes.get(i + 1).map_or(true, |n| *n == b' ') {
            return Some(collapsed[..=i].to_string());
        }
    }
    Some(collapsed)
}

/// Split doc text into paragraphs, code blocks and headings.
pub fn blocks(text: &str) -> Vec<Block> {
    let mut out = Vec::new();
    let mut para: Vec<&str> = Vec::new();
    let mut code: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_paragraph(&mut out, &mut para);
            if !code.is_empty() {
                code.push("");
            }
            continue;
        }
        if line.starts_with([' ', '\t']) {
            flush_paragraph(&mut out, &mut para);
            code.push(line);
            continue;
        }
        flush_code(&mut out, &mut code);
        para.push(line);
    }
    flush_paragraph(&mut out, &mut para);
    flush_code(&mut out, &mut code);
    out
}

fn flush_paragraph(out: &mut Vec<Block>, para: &mut Vec<&str>) {
    if para.is_empty() {
        return;
    }
    match para.as_slice() {
        [single] if single.starts_with("# ") => {
            out.push(Block::Heading(single[2..].trim().to_string()));
        }
        lines => out.push(Block::Paragraph(lines.join("\n"))),
    }
    para.clear();
}

fn flush_code(out: &mut Vec<Block>, code: &mut Vec<&str>) {
    while code.last().is_some_and(|l| l.is_empty()) {
        code.pop();
    }
    if code.is_empty() {
        return;
    }
    out.push(Block::Code(dedent(code)));
    code.clear();
}

/// Remove the longest whitespace prefix shared by all non-blank lines.
pub fn dedent(lines: &[&str]) -> String {
    let prefix = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| &l[..l.len() - l.trim_start().len()])
        .reduce(|a, b| {
            let n = a
                .char_indices()
                .zip(b.chars())
                .take_while(|((_, x), y)| x == y)
                .last()
                .map_or(0, |((i, c), _)| i + c.len_utf8());
            &a[..n]
        })
        .unwrap_or("");

    lines
        .iter()
        .map(|l| l.strip_prefix(prefix).unwrap_or(l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
