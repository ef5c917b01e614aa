//! Document assembly: walks the package model and stitches formatter output
//! into one markdown document.

use crate::format::{Format, FormatError};
use crate::lang::doc::{blocks, Block};
use crate::lang::{Entity, Example, Func, LangError, Package, Type, Value};

/// First line of generated documents unless a custom header is given.
pub const GENERATED_NOTICE: &str = "<!-- Code generated by pkgdoc. DO NOT EDIT. -->";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Lang(#[from] LangError),
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Text placed above the documentation instead of the generated notice.
    pub header: Option<String>,
    /// Text placed below the documentation.
    pub footer: Option<String>,
    /// Order entities by name instead of declaration order.
    pub sort: bool,
}

pub struct Renderer<'a> {
    format: &'a dyn Format,
    options: RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(format: &'a dyn Format, options: RenderOptions) -> Self {
        Self { format, options }
    }

    pub fn render_package(&self, pkg: &Package) -> Result<String, RenderError> {
        self.render_packages(std::slice::from_ref(pkg))
    }

    /// Render several packages into one document sharing header and footer.
    pub fn render_packages(&self, pkgs: &[Package]) -> Result<String, RenderError> {
        let header = match &self.options.header {
            Some(text) => text.trim_end().to_string(),
            None => GENERATED_NOTICE.to_string(),
        };
        let mut out = vec![header];
        for pkg in pkgs {
            self.package(pkg, &mut out)?;
        }
        if let Some(footer) = &self.options.footer {
            out.push(footer.trim_end().to_string());
        }
        out.retain(|block| !block.is_empty());
        Ok(out.join("\n\n") + "\n")
    }

    fn package(&self, pkg: &Package, out: &mut Vec<String>) -> Result<(), RenderError> {
        let f = self.format;
        let level = pkg.level();

        out.push(f.header(level, pkg.name())?);
        if let Some(path) = pkg.import_path() {
            out.push(f.code_block("go", &format!("import \"{path}\"")));
        }
        self.doc(pkg.doc(), level, out)?;
        for example in pkg.examples() {
            out.push(self.example(example)?);
        }

        let index = self.index(pkg);
        if !index.is_empty() {
            out.push(f.header(level + 1, "Index")?);
            out.push(index);
        }

        if !pkg.consts().is_empty() {
            out.push(f.header(level + 1, "Constants")?);
            for value in self.sorted(pkg.consts()) {
                self.value(value, out)?;
            }
        }
        if !pkg.vars().is_empty() {
            out.push(f.header(level + 1, "Variables")?);
            for value in self.sorted(pkg.vars()) {
                self.value(value, out)?;
            }
        }

        for func in self.sorted(pkg.funcs()) {
            self.func(func, out)?;
        }
        for ty in self.sorted(pkg.types()) {
            self.type_section(ty, out)?;
        }
        Ok(())
    }

    fn index(&self, pkg: &Package) -> String {
        let f = self.format;
        let entry = |depth: usize, text: &str, heading: &str| {
            f.list_entry(depth, &f.link(&f.escape(text), &f.local_href(heading)))
        };

        let mut lines = Vec::new();
        if !pkg.consts().is_empty() {
            lines.push(entry(0, "Constants", "Constants"));
        }
        if !pkg.vars().is_empty() {
            lines.push(entry(0, "Variables", "Variables"));
        }
        for func in self.sorted(pkg.funcs()) {
            lines.push(entry(0, &func.signature(), &func.title()));
        }
        for ty in self.sorted(pkg.types()) {
            lines.push(entry(0, &ty.title(), &ty.title()));
            for func in self.sorted(ty.funcs()).into_iter().chain(self.sorted(ty.methods())) {
                lines.push(entry(1, &func.signature(), &func.title()));
            }
        }
        lines.retain(|l| !l.is_empty());
        lines.join("\n")
    }

    fn value(&self, value: &Value, out: &mut Vec<String>) -> Result<(), RenderError> {
        self.doc(value.doc(), value.level(), out)?;
        out.push(self.format.code_block("go", &value.decl()?));
        Ok(())
    }

    fn func(&self, func: &Func, out: &mut Vec<String>) -> Result<(), RenderError> {
        out.push(self.linked_header(func, &func.title())?);
        out.push(self.format.code_block("go", &func.decl()?));
        self.doc(func.doc(), func.level(), out)?;
        for example in func.examples() {
            out.push(self.example(example)?);
        }
        Ok(())
    }

    fn type_section(&self, ty: &Type, out: &mut Vec<String>) -> Result<(), RenderError> {
        out.push(self.linked_header(ty, &ty.title())?);
        out.push(self.format.code_block("go", &ty.decl()?));
        self.doc(ty.doc(), ty.level(), out)?;
        for example in ty.examples() {
            out.push(self.example(example)?);
        }
        for value in self.sorted(ty.consts()).into_iter().chain(self.sorted(ty.vars())) {
            self.value(value, out)?;
        }
        for func in self.sorted(ty.funcs()).into_iter().chain(self.sorted(ty.methods())) {
            self.func(func, out)?;
        }
        Ok(())
    }

    /// Heading whose text links to the entity's source, when a link exists.
    fn linked_header(&self, entity: &dyn Entity, title: &str) -> Result<String, RenderError> {
        let f = self.format;
        let href = f.code_href(entity.location());
        let text = f.link(&title.replace('*', "\\*"), &href);
        Ok(f.raw_header(entity.level(), &text)?)
    }

    fn example(&self, example: &Example) -> Result<String, RenderError> {
        let f = self.format;
        let mut body = Vec::new();
        self.doc(example.doc(), example.level(), &mut body)?;
        if !example.code().is_empty() {
            body.push(f.code_block("go", example.code()));
        }
        if let Some(output) = example.output() {
            body.push(f.bold("Output"));
            body.push(f.code_block("", output));
        }
        let title = match example.title() {
            "Example" => "Example".to_string(),
            suffix => format!("Example ({suffix})"),
        };
        Ok(f.accordion(&title, &body.join("\n\n")))
    }

    fn doc(&self, text: &str, level: usize, out: &mut Vec<String>) -> Result<(), RenderError> {
        let f = self.format;
        for block in blocks(text) {
            match block {
                Block::Paragraph(p) => out.push(f.escape(&p)),
                Block::Heading(h) => out.push(f.header(level + 1, &h)?),
                Block::Code(c) => out.push(f.code_block("", &c)),
            }
        }
        Ok(())
    }

    fn sorted<'e, E: Entity>(&self, items: &'e [E]) -> Vec<&'e E> {
        let mut items: Vec<&E> = items.iter().collect();
        if self.options.sort {
            items.sort_by(|a, b| a.name().cmp(b.name()));
        }
        items
    }
}
