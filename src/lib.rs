//! pkgdoc: markdown documentation for Go packages.
//!
//! The crate parses Go source into a documentation model ([`lang`]), shapes
//! text for a markdown dialect ([`format`]) and assembles documents from the
//! two ([`render`]). The `pkgdoc` binary wires these to the command line.

pub mod config;
pub mod format;
pub mod lang;
pub mod parser;
pub mod render;
pub mod vcs;
