//! Parser module: reads a Go package directory into declaration nodes.

pub mod ast;
pub mod go;
pub mod token;

pub use go::{parse_file, File};
pub use token::Pos;

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static RE_MODULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*module\s+"?([^"\s]+)"?\s*$"#).unwrap());

static RE_BUILD_IGNORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^//\s*(go:build|\+build)\s+ignore\s*$").unwrap());

/// Errors from reading or parsing Go sources.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{pos}: {message}", .path.display())]
    Syntax {
        path: PathBuf,
        pos: Pos,
        message: String,
    },

    #[error("no Go files in {}", .0.display())]
    NoGoFiles(PathBuf),

    #[error("found packages {first} and {second} in {}", .dir.display())]
    MultiplePackages {
        dir: PathBuf,
        first: String,
        second: String,
    },
}

/// All Go files of one package directory.
#[derive(Debug, Clone)]
pub struct ParsedPackage {
    pub name: String,
    /// Absolute directory path.
    pub dir: PathBuf,
    /// Import path from the enclosing `go.mod`, when there is one.
    pub import_path: Option<String>,
    /// Non-test files, sorted by file name.
    pub files: Vec<File>,
    /// `_test.go` files of the package or its external `_test` package.
    pub test_files: Vec<File>,
}

impl ParsedPackage {
    /// The file carrying the package documentation: `doc.go` when it has a
    /// package comment, else the first file that does, else the first file.
    pub fn doc_file(&self) -> Option<&File> {
        let documented = |f: &&File| f.doc.is_some();
        self.files
            .iter()
            .filter(documented)
            .find(|f| f.path.file_name().is_some_and(|n| n == "doc.go"))
            .or_else(|| self.files.iter().find(documented))
            .or_else(|| self.files.first())
    }
}

/// Parse every `.go` file in `dir`.
pub fn parse_dir(dir: &Path) -> Result<ParsedPackage, ParseError> {
    let dir = std::path::absolute(dir).map_err(|source| ParseError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let entries = fs::read_dir(&dir).map_err(|source| ParseError::Io {
        path: dir.clone(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "go"))
        .collect();
    paths.sort();

    let mut files: Vec<File> = Vec::new();
    let mut test_files: Vec<File> = Vec::new();
    for path in paths {
        let source = fs::read_to_string(&path).map_err(|source| ParseError::Io {
            path: path.clone(),
            source,
        })?;
        if is_ignored(&source) {
            tracing::debug!(path = %path.display(), "skipping file with ignore build constraint");
            continue;
        }
        let file = parse_file(&path, &source)?;
        let is_test = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("_test.go"));
        if is_test {
            test_files.push(file);
        } else {
            files.push(file);
        }
    }

    let name = match files.first() {
        Some(file) => file.package.clone(),
        None => return Err(ParseError::NoGoFiles(dir)),
    };
    if let Some(other) = files.iter().find(|f| f.package != name) {
        return Err(ParseError::MultiplePackages {
            first: name,
            second: other.package.clone(),
            dir,
        });
    }

    let external = format!("{name}_test");
    test_files.retain(|f| {
        let keep = f.package == name || f.package == external;
        if !keep {
            tracing::warn!(path = %f.path.display(), package = %f.package, "ignoring test file from another package");
        }
        keep
    });

    let import_path = module_import_path(&dir);
    tracing::debug!(dir = %dir.display(), package = %name, files = files.len(), "parsed package");

    Ok(ParsedPackage {
        name,
        dir,
        import_path,
        files,
        test_files,
    })
}

/// Whether a build constraint before the package clause excludes the file.
fn is_ignored(source: &str) -> bool {
    let header = source.split("\npackage ").next().unwrap_or(source);
    RE_BUILD_IGNORE.is_match(header)
}

/// Import path of `dir` from the nearest `go.mod` at or above it.
pub fn module_import_path(dir: &Path) -> Option<String> {
    for root in dir.ancestors() {
        let Ok(contents) = fs::read_to_string(root.join("go.mod")) else {
            continue;
        };
        let module = RE_MODULE.captures(&contents)?[1].to_string();
        let rel = dir.strip_prefix(root).ok()?;
        let mut path = module;
        for part in rel.components() {
            path.push('/');
            path.push_str(&part.as_os_str().to_string_lossy());
        }
        return Some(path);
    }
    None
}
