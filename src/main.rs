//! pkgdoc: generate markdown documentation from Go packages.
//!
//! - **stdout mode**: `pkgdoc ./...` prints one document for every package
//! - **file mode**: `pkgdoc -o '${dir}/README.md' ./...` writes one file per package
//! - **check mode**: `--check` compares instead of writing and fails on drift

use anyhow::{bail, Context, Result};
use clap::Parser;
use pkgdoc::config::{CliSettings, Config};
use pkgdoc::format::create_format;
use pkgdoc::lang::{Entity, Package, Scope};
use pkgdoc::render::{RenderOptions, Renderer};
use pkgdoc::vcs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pkgdoc",
    version,
    about = "Generate markdown documentation from Go packages"
)]
struct Cli {
    /// Package directories, glob patterns, or `dir/...` for every package
    /// below a directory.
    #[arg(default_value = ".")]
    packages: Vec<String>,

    /// Output path. `${name}` and `${dir}` expand per package and produce
    /// one file each. Without it the documentation goes to stdout.
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// Output format: github (default), gitlab, azure-devops, plain
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// Document unexported symbols too
    #[arg(short = 'u', long)]
    include_unexported: bool,

    /// Order symbols by name instead of declaration order
    #[arg(long)]
    sort: bool,

    /// Text placed at the top of each document
    #[arg(long, conflicts_with = "header_file")]
    header: Option<String>,

    /// File whose contents are placed at the top of each document
    #[arg(long)]
    header_file: Option<PathBuf>,

    /// Text placed at the bottom of each document
    #[arg(long, conflicts_with = "footer_file")]
    footer: Option<String>,

    /// File whose contents are placed at the bottom of each document
    #[arg(long)]
    footer_file: Option<PathBuf>,

    /// Repository URL used for source links
    #[arg(long)]
    repository_url: Option<String>,

    /// Branch used for source links
    #[arg(long)]
    repository_default_branch: Option<String>,

    /// Path of the working directory inside the repository, e.g. `/sub/dir`
    #[arg(long)]
    repository_path: Option<String>,

    /// Fail if the output files are missing or out of date instead of writing them
    #[arg(long)]
    check: bool,

    /// Configuration file (default: .pkgdoc.toml in the working directory or a parent)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log debug details
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    verbose: bool,

    /// Log errors only
    #[arg(short = 'q', long)]
    quiet: bool,
}

impl Cli {
    fn settings(&self) -> CliSettings {
        CliSettings {
            format: self.format.clone(),
            output: self.output.clone(),
            include_unexported: self.include_unexported.then_some(true),
            sort: self.sort.then_some(true),
            header: self.header.clone(),
            header_file: self.header_file.clone(),
            footer: self.footer.clone(),
            footer_file: self.footer_file.clone(),
            repository_url: self.repository_url.clone(),
            repository_default_branch: self.repository_default_branch.clone(),
            repository_path: self.repository_path.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref(), Some(&cli.settings()))?;
    let work_dir = std::env::current_dir().context("failed to read the working directory")?;

    let repo = vcs::merge(
        vcs::discover(&work_dir),
        config.repository.url.as_deref(),
        config.repository.default_branch.as_deref(),
        config.repository.path.as_deref(),
    );
    if repo.is_none() {
        debug!("no repository information, source links are disabled");
    }
    let scope = Scope::new(&work_dir)
        .with_repo(repo)
        .with_unexported(config.include_unexported);

    let dirs = expand_packages(&cli.packages)?;
    if dirs.is_empty() {
        bail!("no Go packages found in: {}", cli.packages.join(" "));
    }
    let mut packages = Vec::with_capacity(dirs.len());
    for dir in &dirs {
        let pkg = Package::load(dir, &scope)
            .with_context(|| format!("failed to load package {}", dir.display()))?;
        debug!(name = pkg.name(), dir = %dir.display(), "loaded package");
        packages.push(pkg);
    }

    let format = create_format(&config.format)?;
    let options = RenderOptions {
        header: config.header_text()?,
        footer: config.footer_text()?,
        sort: config.sort,
    };
    let renderer = Renderer::new(format.as_ref(), options);

    let outputs = match config.output.as_deref() {
        None => {
            if cli.check {
                bail!("--check needs an output path (-o or `output` in the config file)");
            }
            print!("{}", renderer.render_packages(&packages)?);
            return Ok(());
        }
        Some(template) if is_template(template) => {
            let mut outputs = Vec::with_capacity(packages.len());
            for pkg in &packages {
                let path = expand_output(template, pkg.name(), &dir_label(pkg.dir(), &work_dir));
                outputs.push((path, renderer.render_package(pkg)?));
            }
            outputs
        }
        Some(path) => vec![(PathBuf::from(path), renderer.render_packages(&packages)?)],
    };

    if cli.check {
        check_outputs(&outputs)
    } else {
        write_outputs(&outputs)
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn write_outputs(outputs: &[(PathBuf, String)]) -> Result<()> {
    for (path, content) in outputs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote documentation");
    }
    Ok(())
}

fn check_outputs(outputs: &[(PathBuf, String)]) -> Result<()> {
    let mut stale = Vec::new();
    for (path, content) in outputs {
        if fs::read_to_string(path).ok().as_deref() != Some(content.as_str()) {
            warn!(path = %path.display(), "documentation is out of date");
            stale.push(path.display().to_string());
        }
    }
    if !stale.is_empty() {
        bail!("documentation is out of date: {}", stale.join(", "));
    }
    Ok(())
}

/// Directories skipped by `dir/...` patterns.
const SKIPPED_DIRS: &[&str] = &["testdata", "vendor"];

/// Expand package arguments into package directories.
fn expand_packages(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for pattern in patterns {
        if let Some(root) = recursive_root(pattern) {
            let before = dirs.len();
            walk_packages(Path::new(root), &mut dirs)?;
            if dirs.len() == before {
                warn!("no packages matched: {}", pattern);
            }
            continue;
        }
        let path = Path::new(pattern);
        if path.is_dir() {
            dirs.push(path.to_path_buf());
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {pattern}"))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_dir())
            .collect();
        if matches.is_empty() {
            warn!("no packages matched: {}", pattern);
        }
        dirs.extend(matches);
    }
    dirs.sort();
    dirs.dedup();
    Ok(dirs)
}

/// `./...` gives `.`, `pkg/...` gives `pkg`.
fn recursive_root(pattern: &str) -> Option<&str> {
    if pattern == "..." {
        return Some(".");
    }
    let root = pattern.strip_suffix("/...")?;
    Some(if root.is_empty() { "/" } else { root })
}

fn walk_packages(dir: &Path, dirs: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?;
    let mut has_source = false;
    let mut children = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            if !name.starts_with('.') && !name.starts_with('_') && !SKIPPED_DIRS.contains(&name.as_str()) {
                children.push(path);
            }
        } else if name.ends_with(".go") && !name.ends_with("_test.go") {
            has_source = true;
        }
    }
    if has_source {
        dirs.push(dir.to_path_buf());
    }
    children.sort();
    for child in children {
        walk_packages(&child, dirs)?;
    }
    Ok(())
}

fn is_template(output: &str) -> bool {
    output.contains("${name}") || output.contains("${dir}")
}

fn expand_output(template: &str, name: &str, dir: &str) -> PathBuf {
    PathBuf::from(template.replace("${name}", name).replace("${dir}", dir))
}

/// Package directory relative to the working directory, `.` for the
/// working directory itself.
fn dir_label(dir: &Path, work_dir: &Path) -> String {
    match dir.strip_prefix(work_dir) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => dir.to_string_lossy().into_owned(),
    }
}
