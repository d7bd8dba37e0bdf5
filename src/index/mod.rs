//! Symbol and example index for one directory of Rust sources.
//!
//! Every documented item gets a lookup key:
//!
//! | item | key |
//! |---|---|
//! | free function, type, const/static, macro | its name |
//! | method in any `impl` | `Host.method` (`&Host`, `Host<T>`, `a::Host` normalized) |
//! | documented `pub` field, enum variant, trait item | `Type.member` |
//! | file-level docs | file name with `.` replaced by `_` |
//! | example in a test file | `Example` + name |
//!
//! A later item with the same key replaces an earlier one.

pub mod examples;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::config::IndexConfig;
use crate::error::{DocError, Result};
use crate::slice;
use crate::source::{lower, DeclKind, FileWalker, Parser, SourceUnit};

pub use examples::Example;

static DOC_SLICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w.]+)\[([0-9:, ]+)\]$").expect("valid regex"));

/// Immutable once built
#[derive(Debug, Default)]
pub struct DocIndex {
    name: String,
    dir: PathBuf,
    docs: HashMap<String, String>,
    examples: HashMap<String, Example>,
}

impl DocIndex {
    /// Parse every `.rs` file directly inside `dir`. The first file that
    /// fails to read or parse aborts the build.
    pub fn build(dir: &Path, config: &IndexConfig) -> Result<Self> {
        let files = FileWalker::new().walk(dir)?;
        let parser = Parser::new();

        let mut units = Vec::with_capacity(files.len());
        for file in &files {
            let parsed = parser.parse_file(file)?;
            units.push(lower(&parsed));
        }

        let mut index = Self::from_units(&units, config);
        index.name = crate_name(dir);
        index.dir = dir.to_path_buf();

        tracing::info!(
            "Indexed {} files from {}: {} docs, {} examples",
            files.len(),
            dir.display(),
            index.docs.len(),
            index.examples.len()
        );
        Ok(index)
    }

    /// Index already-lowered files, in the order given
    pub fn from_units(units: &[SourceUnit], config: &IndexConfig) -> Self {
        let mut index = Self::default();
        for unit in units {
            let before = (index.docs.len(), index.examples.len());
            if config.is_test_file(&unit.file_name) {
                index.scan_examples(unit, config);
            }
            index.scan_docs(unit);
            tracing::debug!(
                "{}: {} docs, {} examples",
                unit.path.display(),
                index.docs.len() - before.0,
                index.examples.len() - before.1
            );
        }
        index
    }

    fn scan_examples(&mut self, unit: &SourceUnit, config: &IndexConfig) {
        for example in examples::extract(unit, config) {
            let key = example.key.clone();
            if self.examples.insert(key.clone(), example).is_some() {
                tracing::debug!("Example {} redeclared in {}", key, unit.path.display());
            }
        }
    }

    fn scan_docs(&mut self, unit: &SourceUnit) {
        if !unit.doc.is_empty() {
            self.insert_doc(file_key(&unit.file_name), &unit.doc);
        }

        for decl in &unit.decls {
            match &decl.kind {
                DeclKind::Function(_) | DeclKind::Macro => {
                    if !decl.doc.is_empty() {
                        self.insert_doc(decl.name.clone(), &decl.doc);
                    }
                }
                DeclKind::Impl { host, methods } => {
                    for method in methods.iter().filter(|m| !m.doc.is_empty()) {
                        let key = format!("{}.{}", host.base_name(), method.name);
                        self.insert_doc(key, &method.doc);
                    }
                }
                DeclKind::Type { members } => {
                    if !decl.doc.is_empty() {
                        self.insert_doc(decl.name.clone(), &decl.doc);
                    }
                    for member in members.iter().filter(|m| m.visible && !m.doc.is_empty()) {
                        let key = format!("{}.{}", decl.name, member.name);
                        self.insert_doc(key, &member.doc);
                    }
                }
                DeclKind::Value { names } => {
                    if let Some(first) = names.first().filter(|_| !decl.doc.is_empty()) {
                        self.insert_doc(first.clone(), &decl.doc);
                    }
                }
                DeclKind::Use { .. } | DeclKind::Other => {}
            }
        }
    }

    fn insert_doc(&mut self, key: String, text: &str) {
        if self.docs.insert(key.clone(), text.to_string()).is_some() {
            tracing::debug!("Doc entry {} overwritten", key);
        }
    }

    /// Crate name from `Cargo.toml`, or the directory name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Doc text for `name`. Without a slice the text is returned trimmed of
    /// surrounding line breaks only; with one it goes through [`slice::resolve`].
    pub fn lookup_doc(&self, name: &str, slice_spec: Option<&str>) -> Result<String> {
        match slice_spec {
            None => Ok(self.raw_doc(name)?.trim_matches('\n').to_string()),
            Some(spec) => self.resolve_doc(name, spec, &format!("{}[{}]", name, spec)),
        }
    }

    /// Template form: `Name` or `Name[spec]`, e.g. `DocIndex.build[0,2:]`
    pub fn doc(&self, expr: &str) -> Result<String> {
        if let Some(caps) = DOC_SLICE.captures(expr) {
            return self.resolve_doc(&caps[1], &caps[2], expr);
        }
        self.lookup_doc(expr, None)
    }

    fn resolve_doc(&self, name: &str, spec: &str, full: &str) -> Result<String> {
        let text = self.raw_doc(name)?;
        slice::resolve(full, spec, text)
    }

    fn raw_doc(&self, name: &str) -> Result<&str> {
        self.docs
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| DocError::doc_not_found(name))
    }

    pub fn example(&self, name: &str) -> Result<&Example> {
        self.examples
            .get(name)
            .ok_or_else(|| DocError::example_not_found(name))
    }

    pub fn doc_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.docs.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn example_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.examples.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// `lib.rs` -> `lib_rs`
pub fn file_key(file_name: &str) -> String {
    file_name.replace('.', "_")
}

#[derive(Deserialize)]
struct Manifest {
    package: Option<ManifestPackage>,
}

#[derive(Deserialize)]
struct ManifestPackage {
    name: String,
}

fn crate_name(dir: &Path) -> String {
    for candidate in [Some(dir), dir.parent()].into_iter().flatten() {
        let manifest = candidate.join("Cargo.toml");
        let Ok(content) = std::fs::read_to_string(&manifest) else {
            continue;
        };
        match toml::from_str::<Manifest>(&content) {
            Ok(Manifest {
                package: Some(package),
            }) => return package.name,
            Ok(_) => {}
            Err(e) => tracing::warn!("Ignoring unreadable {}: {}", manifest.display(), e),
        }
    }

    dir.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(dir)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Parser;

    fn unit(file_name: &str, source: &str) -> SourceUnit {
        let parsed = Parser::new()
            .parse_source(source, Path::new(file_name))
            .unwrap();
        parsed.check_syntax().unwrap();
        lower(&parsed)
    }

    fn index(units: &[SourceUnit]) -> DocIndex {
        DocIndex::from_units(units, &IndexConfig::default())
    }

    #[test]
    fn test_function_and_type_keys() {
        let idx = index(&[unit(
            "lib.rs",
            "/// Builds it.\npub fn build() {}\n\n/// A map.\npub struct CodeMap {\n    /// The name.\n    pub name: String,\n    /// Private.\n    dir: String,\n    pub undocumented: u8,\n}\n\nfn silent() {}\n",
        )]);
        assert_eq!(idx.lookup_doc("build", None).unwrap(), "Builds it.");
        assert_eq!(idx.lookup_doc("CodeMap", None).unwrap(), "A map.");
        assert_eq!(idx.lookup_doc("CodeMap.name", None).unwrap(), "The name.");
        assert!(idx.lookup_doc("CodeMap.dir", None).is_err());
        assert!(idx.lookup_doc("CodeMap.undocumented", None).is_err());
        assert!(idx.lookup_doc("silent", None).is_err());
    }

    #[test]
    fn test_method_keys_normalize_host() {
        let idx = index(&[unit(
            "lib.rs",
            "pub struct Map<T>(T);\nimpl<T> Map<T> {\n    /// Gets.\n    pub fn get(&self) {}\n}\nimpl<'a, T> Iterator for &'a Map<T> {\n    type Item = T;\n    /// Steps.\n    fn next(&mut self) -> Option<T> { None }\n}\n",
        )]);
        assert_eq!(idx.lookup_doc("Map.get", None).unwrap(), "Gets.");
        assert_eq!(idx.lookup_doc("Map.next", None).unwrap(), "Steps.");
    }

    #[test]
    fn test_file_value_and_member_keys() {
        let idx = index(&[unit(
            "code_map.rs",
            "//! File docs.\n\n/// The limit.\npub const LIMIT: usize = 3;\nconst QUIET: u8 = 0;\n\n/// Colors.\npub enum Color {\n    /// Warm.\n    Red,\n}\n\n/// Drawing.\npub trait Draw {\n    /// Paints.\n    fn paint(&self);\n}\n\n/// Echoes.\nmacro_rules! echo { () => {} }\n",
        )]);
        assert_eq!(idx.lookup_doc("code_map_rs", None).unwrap(), "File docs.");
        assert_eq!(idx.lookup_doc("LIMIT", None).unwrap(), "The limit.");
        assert!(idx.lookup_doc("QUIET", None).is_err());
        assert_eq!(idx.lookup_doc("Color.Red", None).unwrap(), "Warm.");
        assert_eq!(idx.lookup_doc("Draw.paint", None).unwrap(), "Paints.");
        assert_eq!(idx.lookup_doc("echo", None).unwrap(), "Echoes.");
    }

    #[test]
    fn test_later_declaration_overwrites() {
        let idx = index(&[
            unit("a.rs", "/// First.\npub fn dup() {}\n"),
            unit("b.rs", "/// Second.\npub fn dup() {}\n"),
        ]);
        assert_eq!(idx.lookup_doc("dup", None).unwrap(), "Second.");
    }

    #[test]
    fn test_examples_only_from_test_files() {
        let source = "#[test]\nfn t() {}\nfn example_foo() {\n    // Output: x\n}\n";
        let idx = index(&[unit("lib.rs", source), unit("lib_test.rs", source)]);
        assert_eq!(idx.example_keys(), vec!["ExampleFoo"]);
        assert!(idx.example("ExampleBar").is_err());
    }

    #[test]
    fn test_doc_template_form() {
        let idx = index(&[unit(
            "lib.rs",
            "/// One. Two. Three.\npub fn f() {}\nstruct S;\nimpl S {\n    /// Alpha. Beta.\n    fn m(&self) {}\n}\n",
        )]);
        assert_eq!(idx.doc("f").unwrap(), "One. Two. Three.");
        assert_eq!(idx.doc("f[1]").unwrap(), "Two.");
        assert_eq!(idx.doc("S.m[0]").unwrap(), "Alpha.");
        assert!(matches!(idx.doc("g[0]"), Err(DocError::NotFound { .. })));
    }

    #[test]
    fn test_whole_entry_differs_from_full_range_slice() {
        let idx = index(&[unit("lib.rs", "/// A.\n/// B.\n/// C. D.\npub fn f() {}\n")]);
        assert_eq!(idx.lookup_doc("f", None).unwrap(), "A.\nB.\nC. D.");
        assert_eq!(idx.lookup_doc("f", Some("0:3")).unwrap(), "A.\nB.\nC.");
        assert_eq!(idx.lookup_doc("f", Some("0")).unwrap(), "A.");
    }

    #[test]
    fn test_unknown_doc_error_names_symbol() {
        let idx = index(&[]);
        let err = idx.lookup_doc("Missing", None).unwrap_err();
        assert_eq!(err.to_string(), "Doc Missing not found");
    }

    #[test]
    fn test_file_key() {
        assert_eq!(file_key("lib.rs"), "lib_rs");
        assert_eq!(file_key("a.b.rs"), "a_b_rs");
    }
}
