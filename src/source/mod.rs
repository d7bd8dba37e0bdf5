//! Parsed-source model consumed by the index.
//!
//! The tree-sitter syntax tree never leaves this module: [`lower`] turns a
//! [`ParsedFile`] into a [`SourceUnit`] holding plain declarations with byte
//! spans into the original text.

pub mod comments;
pub mod lower;
pub mod parser;
pub mod walker;

use std::collections::BTreeSet;
use std::ops::Range;
use std::path::PathBuf;

pub use lower::lower;
pub use parser::{ParsedFile, Parser};
pub use walker::FileWalker;

/// One parsed `.rs` file
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub file_name: String,
    pub source: String,
    /// File-level doc text (`//!`, `/*! */`, `#![doc]`)
    pub doc: String,
    pub decls: Vec<Declaration>,
}

impl SourceUnit {
    pub fn text(&self, span: &Range<usize>) -> &str {
        self.source.get(span.clone()).unwrap_or("")
    }

    pub fn uses(&self) -> impl Iterator<Item = &Declaration> {
        self.decls
            .iter()
            .filter(|d| matches!(d.kind, DeclKind::Use { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Public,
    /// `pub(crate)`, `pub(super)`, `pub(in path)`
    Restricted,
    Private,
}

impl Visibility {
    pub fn from_modifier(text: &str) -> Self {
        match text.trim() {
            "pub" => Visibility::Public,
            "" => Visibility::Private,
            _ => Visibility::Restricted,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// A top-level item, or a method nested in an impl
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Empty for impls and `use` declarations
    pub name: String,
    pub kind: DeclKind,
    pub doc: String,
    /// Whole item including leading doc comments and attributes
    pub span: Range<usize>,
    /// Identifiers and type names mentioned anywhere inside the item
    pub idents: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Function(FnInfo),
    Impl {
        host: TypeExpr,
        methods: Vec<Declaration>,
    },
    Type {
        members: Vec<Member>,
    },
    Value {
        names: Vec<String>,
    },
    Macro,
    Use {
        path: String,
    },
    Other,
}

#[derive(Debug, Clone)]
pub struct FnInfo {
    pub name_span: Range<usize>,
    pub body: Option<Range<usize>>,
    pub has_params: bool,
    pub has_return: bool,
    /// Carries `#[test]`, `#[bench]` or a `path::test` attribute
    pub is_test: bool,
    pub trailing_comment: Option<TrailingComment>,
}

/// The last comment group of a function body
#[derive(Debug, Clone)]
pub struct TrailingComment {
    pub text: String,
    /// From the start of the first comment line to the end of the last comment
    pub span: Range<usize>,
}

/// A struct/union field, enum variant or trait associated function
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub doc: String,
    pub visible: bool,
}

/// Structural form of an impl's self type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    /// `&T`, `&mut T`, `&'a T`
    Reference(Box<TypeExpr>),
    /// `*const T`, `*mut T`
    Pointer(Box<TypeExpr>),
    /// `T<A, B>`
    Generic(Box<TypeExpr>),
    /// `a::b::T`, holding the last segment
    Scoped(String),
    Other(String),
}

impl TypeExpr {
    /// Name of the underlying named type, looking through references,
    /// pointers, generic arguments and paths
    pub fn base_name(&self) -> &str {
        match self {
            TypeExpr::Named(name) => name,
            TypeExpr::Reference(inner) | TypeExpr::Pointer(inner) | TypeExpr::Generic(inner) => {
                inner.base_name()
            }
            TypeExpr::Scoped(name) => name,
            TypeExpr::Other(text) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_unwraps_references() {
        let ty = TypeExpr::Reference(Box::new(TypeExpr::Generic(Box::new(TypeExpr::Named(
            "CodeMap".to_string(),
        )))));
        assert_eq!(ty.base_name(), "CodeMap");
    }

    #[test]
    fn test_base_name_scoped() {
        let ty = TypeExpr::Pointer(Box::new(TypeExpr::Scoped("DocIndex".to_string())));
        assert_eq!(ty.base_name(), "DocIndex");
    }

    #[test]
    fn test_visibility_from_modifier() {
        assert_eq!(Visibility::from_modifier("pub"), Visibility::Public);
        assert_eq!(Visibility::from_modifier(""), Visibility::Private);
        assert_eq!(
            Visibility::from_modifier("pub(crate)"),
            Visibility::Restricted
        );
        assert!(!Visibility::from_modifier("pub(super)").is_public());
    }
}
