use std::path::{Path, PathBuf};

use crate::error::{DocError, Result};

pub struct Parser {
    language: tree_sitter::Language,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// Read and parse a file, rejecting sources with syntax errors
    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        let bytes = std::fs::read(path)?;
        let source = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            let column = valid.iter().rev().take_while(|&&b| b != b'\n').count() + 1;
            parse_error(path, line, column, "invalid UTF-8".to_string())
        })?;
        let parsed = self.parse_source(&source, path)?;
        parsed.check_syntax()?;
        Ok(parsed)
    }

    pub fn parse_source(&self, source: &str, path: &Path) -> Result<ParsedFile> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| parse_error(path, 0, 0, e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| parse_error(path, 0, 0, "Failed to parse source".to_string()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_string(),
            path: path.to_path_buf(),
        })
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_error(path: &Path, line: usize, column: usize, message: String) -> DocError {
    DocError::Parse {
        path: path.to_path_buf(),
        line,
        column,
        message,
    }
}

#[derive(Debug)]
pub struct ParsedFile {
    pub tree: tree_sitter::Tree,
    pub source: String,
    pub path: PathBuf,
}

impl ParsedFile {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn node_text(&self, node: &tree_sitter::Node) -> &str {
        node.utf8_text(self.source_bytes()).unwrap_or("")
    }

    /// Fail with the position of the first `ERROR` or `MISSING` node
    pub fn check_syntax(&self) -> Result<()> {
        let root = self.root_node();
        if !root.has_error() {
            return Ok(());
        }

        let node = first_error(root).unwrap_or(root);
        let pos = node.start_position();
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            let snippet: String = self.node_text(&node).chars().take(40).collect();
            format!("unexpected syntax `{}`", snippet.trim())
        };
        Err(parse_error(&self.path, pos.row + 1, pos.column + 1, message))
    }
}

fn first_error(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
