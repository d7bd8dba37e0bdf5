//! Lowering of a tree-sitter-rust syntax tree into a [`SourceUnit`].

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

use super::comments::{self, CommentKind};
use super::{
    DeclKind, Declaration, FnInfo, Member, ParsedFile, SourceUnit, TrailingComment, TypeExpr,
    Visibility,
};

static TEST_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\[\s*(?:\w+::)*(?:test|bench)\b").expect("valid regex")
});

pub fn lower(parsed: &ParsedFile) -> SourceUnit {
    let root = parsed.root_node();
    let mut file_doc: Vec<String> = Vec::new();
    let mut decls = Vec::new();

    for node in named_children(root) {
        match node.kind() {
            "line_comment" | "block_comment" => {
                let (kind, lines) = comments::split_comment(parsed.node_text(&node));
                if kind == CommentKind::InnerDoc {
                    file_doc.extend(lines);
                }
            }
            "inner_attribute_item" => {
                if let Some((true, text)) = comments::doc_attribute(parsed.node_text(&node)) {
                    file_doc.push(text);
                }
            }
            // consumed by the item they precede
            "attribute_item" => {}
            _ => decls.push(lower_item(parsed, node)),
        }
    }

    let file_name = parsed
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    SourceUnit {
        path: parsed.path.clone(),
        file_name,
        source: parsed.source.clone(),
        doc: comments::comment_text(file_doc),
        decls,
    }
}

fn lower_item(parsed: &ParsedFile, node: Node) -> Declaration {
    let lead = leading(parsed, node);
    let name = field_text(parsed, node, "name").unwrap_or_default();
    let body = node.child_by_field_name("body");

    let kind = match node.kind() {
        "function_item" => DeclKind::Function(fn_info(parsed, node, lead.is_test)),
        "impl_item" => {
            let host = node
                .child_by_field_name("type")
                .map(|t| type_expr(parsed, t))
                .unwrap_or_else(|| TypeExpr::Other(String::new()));
            let methods = body
                .map(named_children)
                .unwrap_or_default()
                .into_iter()
                .filter(|c| c.kind() == "function_item")
                .map(|c| lower_item(parsed, c))
                .collect();
            DeclKind::Impl { host, methods }
        }
        "struct_item" | "union_item" => DeclKind::Type {
            members: members(parsed, body, &["field_declaration"], |f| {
                visibility(parsed, f).is_public()
            }),
        },
        "enum_item" => DeclKind::Type {
            members: members(parsed, body, &["enum_variant"], |_| true),
        },
        "trait_item" => DeclKind::Type {
            members: members(
                parsed,
                body,
                &[
                    "function_signature_item",
                    "function_item",
                    "const_item",
                    "associated_type",
                ],
                |_| true,
            ),
        },
        "type_item" => DeclKind::Type {
            members: Vec::new(),
        },
        "const_item" | "static_item" => DeclKind::Value {
            names: if name.is_empty() {
                Vec::new()
            } else {
                vec![name.clone()]
            },
        },
        "macro_definition" => DeclKind::Macro,
        "use_declaration" => DeclKind::Use {
            path: field_text(parsed, node, "argument").unwrap_or_default(),
        },
        _ => DeclKind::Other,
    };

    let mut idents = BTreeSet::new();
    collect_idents(parsed, node, &mut idents);

    Declaration {
        name,
        kind,
        doc: lead.doc,
        span: lead.start..node.end_byte(),
        idents,
    }
}

/// Doc comments and attributes directly preceding an item
struct Leading {
    doc: String,
    start: usize,
    is_test: bool,
}

fn leading(parsed: &ParsedFile, node: Node) -> Leading {
    let mut chunks: Vec<Vec<String>> = Vec::new();
    let mut start = node.start_byte();
    let mut is_test = false;

    let mut prev = node.prev_sibling();
    while let Some(p) = prev {
        let text = parsed.node_text(&p);
        match p.kind() {
            "attribute_item" => {
                if let Some((false, doc)) = comments::doc_attribute(text) {
                    chunks.push(vec![doc]);
                } else if TEST_ATTRIBUTE.is_match(text) {
                    is_test = true;
                }
            }
            "line_comment" | "block_comment" => {
                let (kind, lines) = comments::split_comment(text);
                if kind != CommentKind::OuterDoc {
                    break;
                }
                chunks.push(lines);
            }
            _ => break,
        }
        start = p.start_byte();
        prev = p.prev_sibling();
    }

    chunks.reverse();
    Leading {
        doc: comments::comment_text(chunks.into_iter().flatten()),
        start,
        is_test,
    }
}

fn members(
    parsed: &ParsedFile,
    body: Option<Node>,
    kinds: &[&str],
    visible: impl Fn(Node) -> bool,
) -> Vec<Member> {
    let Some(body) = body else {
        return Vec::new();
    };
    named_children(body)
        .into_iter()
        .filter(|c| kinds.contains(&c.kind()))
        .filter_map(|c| {
            let name = field_text(parsed, c, "name")?;
            Some(Member {
                name,
                doc: leading(parsed, c).doc,
                visible: visible(c),
            })
        })
        .collect()
}

fn fn_info(parsed: &ParsedFile, node: Node, is_test: bool) -> FnInfo {
    let name_span = node
        .child_by_field_name("name")
        .map(|n| n.byte_range())
        .unwrap_or(node.start_byte()..node.start_byte());
    let has_params = node
        .child_by_field_name("parameters")
        .map(|p| named_children(p).iter().any(|c| !is_comment(c)))
        .unwrap_or(false);
    let body = node.child_by_field_name("body");

    FnInfo {
        name_span,
        body: body.map(|b| b.byte_range()),
        has_params,
        has_return: node.child_by_field_name("return_type").is_some(),
        is_test,
        trailing_comment: body.and_then(|b| trailing_comment(parsed, b)),
    }
}

/// The group of adjacent comments that closes a block
fn trailing_comment(parsed: &ParsedFile, block: Node) -> Option<TrailingComment> {
    let mut group: Vec<Node> = Vec::new();
    for child in named_children(block).into_iter().rev() {
        if !is_comment(&child) {
            break;
        }
        if let Some(next) = group.last() {
            if next.start_position().row > last_row(&child) + 1 {
                break;
            }
        }
        group.push(child);
    }
    group.reverse();

    let first = group.first()?;
    let last = group.last()?;
    let lines: Vec<String> = group
        .iter()
        .flat_map(|c| comments::split_comment(parsed.node_text(c)).1)
        .collect();

    let source = parsed.source.as_str();
    let mut start = first.start_byte();
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if source[line_start..start].trim().is_empty() {
        start = line_start;
    }
    let end = source[..last.end_byte()]
        .trim_end_matches(['\n', '\r'])
        .len()
        .max(start);

    Some(TrailingComment {
        text: comments::comment_text(lines),
        span: start..end,
    })
}

fn type_expr(parsed: &ParsedFile, node: Node) -> TypeExpr {
    let text = parsed.node_text(&node).to_string();
    let inner = || {
        node.child_by_field_name("type")
            .map(|t| Box::new(type_expr(parsed, t)))
    };

    match node.kind() {
        "type_identifier" | "primitive_type" => Some(TypeExpr::Named(text.clone())),
        "reference_type" => inner().map(TypeExpr::Reference),
        "pointer_type" => inner().map(TypeExpr::Pointer),
        "generic_type" => inner().map(TypeExpr::Generic),
        "scoped_type_identifier" => field_text(parsed, node, "name").map(TypeExpr::Scoped),
        _ => None,
    }
    .unwrap_or(TypeExpr::Other(text))
}

fn visibility(parsed: &ParsedFile, node: Node) -> Visibility {
    named_children(node)
        .into_iter()
        .find(|c| c.kind() == "visibility_modifier")
        .map(|c| Visibility::from_modifier(parsed.node_text(&c)))
        .unwrap_or(Visibility::Private)
}

fn collect_idents(parsed: &ParsedFile, node: Node, out: &mut BTreeSet<String>) {
    if matches!(node.kind(), "identifier" | "type_identifier") {
        out.insert(parsed.node_text(&node).to_string());
    }
    for child in named_children(node) {
        collect_idents(parsed, child, out);
    }
}

fn field_text(parsed: &ParsedFile, node: Node, field: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| parsed.node_text(&n).to_string())
}

fn is_comment(node: &Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

/// Line comments own their newline, so an end at column 0 belongs to the row above
fn last_row(node: &Node) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row - 1
    } else {
        end.row
    }
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Parser;
    use std::path::Path;

    fn lower_source(source: &str) -> SourceUnit {
        let parsed = Parser::new()
            .parse_source(source, Path::new("lib.rs"))
            .unwrap();
        parsed.check_syntax().unwrap();
        lower(&parsed)
    }

    fn find<'a>(unit: &'a SourceUnit, name: &str) -> &'a Declaration {
        unit.decls.iter().find(|d| d.name == name).unwrap()
    }

    #[test]
    fn test_lower_file_doc() {
        let unit = lower_source("//! Crate level.\n//! Second line.\n\nfn f() {}\n");
        assert_eq!(unit.doc, "Crate level.\nSecond line.\n");
        assert_eq!(unit.file_name, "lib.rs");
    }

    #[test]
    fn test_lower_function_doc_across_attributes() {
        let unit = lower_source(
            "/// Adds numbers.\n#[inline]\n/// Second.\npub fn add(a: i32) -> i32 { a }\n",
        );
        let add = find(&unit, "add");
        assert_eq!(add.doc, "Adds numbers.\nSecond.\n");
        assert!(unit.text(&add.span).starts_with("/// Adds numbers."));
        match &add.kind {
            DeclKind::Function(info) => {
                assert!(info.has_params);
                assert!(info.has_return);
                assert!(!info.is_test);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_lower_plain_comment_is_not_doc() {
        let unit = lower_source("// just a note\nfn quiet() {}\n");
        assert_eq!(find(&unit, "quiet").doc, "");
    }

    #[test]
    fn test_lower_doc_attribute() {
        let unit = lower_source("#[doc = \"Attribute docs.\"]\npub struct S;\n");
        assert_eq!(find(&unit, "S").doc, "Attribute docs.\n");
    }

    #[test]
    fn test_lower_test_attribute() {
        let unit = lower_source("#[test]\nfn checks() {}\n#[tokio::test]\nasync fn later() {}\n");
        for name in ["checks", "later"] {
            match &find(&unit, name).kind {
                DeclKind::Function(info) => assert!(info.is_test, "{name} should be a test"),
                other => panic!("expected function, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_lower_impl_host_and_methods() {
        let unit = lower_source(
            "struct Map;\nimpl<'a> Trait for &'a Map {\n    /// Looks up.\n    fn get(&self) {}\n}\n",
        );
        let imp = unit
            .decls
            .iter()
            .find(|d| matches!(d.kind, DeclKind::Impl { .. }))
            .unwrap();
        match &imp.kind {
            DeclKind::Impl { host, methods } => {
                assert!(matches!(host, TypeExpr::Reference(_)));
                assert_eq!(host.base_name(), "Map");
                assert_eq!(methods.len(), 1);
                assert_eq!(methods[0].name, "get");
                assert_eq!(methods[0].doc, "Looks up.\n");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_lower_generic_and_scoped_hosts() {
        let unit = lower_source("impl<T> Stack<T> {}\nimpl fmt::Display for io::Pipe {}\n");
        let hosts: Vec<String> = unit
            .decls
            .iter()
            .filter_map(|d| match &d.kind {
                DeclKind::Impl { host, .. } => Some(host.base_name().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(hosts, vec!["Stack", "Pipe"]);
    }

    #[test]
    fn test_lower_host_type_structure() {
        let unit = lower_source(
            "impl Walk for &mut tree::leaf::Leaf {}\nimpl Walk for u8 {}\nimpl Walk for [u8] {}\n",
        );
        let hosts: Vec<&TypeExpr> = unit
            .decls
            .iter()
            .filter_map(|d| match &d.kind {
                DeclKind::Impl { host, .. } => Some(host),
                _ => None,
            })
            .collect();
        assert_eq!(
            hosts[0],
            &TypeExpr::Reference(Box::new(TypeExpr::Scoped("Leaf".to_string())))
        );
        assert_eq!(hosts[1], &TypeExpr::Named("u8".to_string()));
        assert_eq!(hosts[2], &TypeExpr::Other("[u8]".to_string()));
    }

    #[test]
    fn test_lower_struct_fields() {
        let unit = lower_source(
            "pub struct Point {\n    /// Horizontal.\n    pub x: f64,\n    /// Hidden.\n    y: f64,\n    #[serde(default)]\n    /// Depth.\n    pub z: f64,\n}\n",
        );
        match &find(&unit, "Point").kind {
            DeclKind::Type { members } => {
                assert_eq!(members.len(), 3);
                assert_eq!(members[0].name, "x");
                assert_eq!(members[0].doc, "Horizontal.\n");
                assert!(members[0].visible);
                assert!(!members[1].visible);
                assert_eq!(members[2].doc, "Depth.\n");
            }
            other => panic!("expected type, got {other:?}"),
        }
    }

    #[test]
    fn test_lower_enum_variants_and_trait_items() {
        let unit = lower_source(
            "enum Color {\n    /// Warm.\n    Red,\n    Blue,\n}\ntrait Draw {\n    /// Paints.\n    fn draw(&self);\n}\n",
        );
        match &find(&unit, "Color").kind {
            DeclKind::Type { members } => {
                assert_eq!(members[0].name, "Red");
                assert_eq!(members[0].doc, "Warm.\n");
                assert_eq!(members[1].doc, "");
            }
            other => panic!("expected type, got {other:?}"),
        }
        match &find(&unit, "Draw").kind {
            DeclKind::Type { members } => assert_eq!(members[0].name, "draw"),
            other => panic!("expected type, got {other:?}"),
        }
    }

    #[test]
    fn test_lower_values_and_uses() {
        let unit = lower_source("use std::fmt;\n/// Limit.\npub const MAX: usize = 3;\nstatic NAME: &str = \"x\";\n");
        assert!(matches!(&find(&unit, "MAX").kind, DeclKind::Value { names } if names == &["MAX"]));
        assert!(matches!(&find(&unit, "NAME").kind, DeclKind::Value { .. }));
        let uses: Vec<_> = unit.uses().collect();
        assert_eq!(uses.len(), 1);
        assert!(matches!(&uses[0].kind, DeclKind::Use { path } if path == "std::fmt"));
    }

    #[test]
    fn test_lower_trailing_comment() {
        let source = "fn example() {\n    run();\n    // Output:\n    // done\n}\n";
        let unit = lower_source(source);
        match &find(&unit, "example").kind {
            DeclKind::Function(info) => {
                let trailing = info.trailing_comment.as_ref().unwrap();
                assert_eq!(trailing.text, "Output:\ndone\n");
                assert_eq!(&source[trailing.span.clone()], "    // Output:\n    // done");
                assert!(!info.has_params);
                assert!(!info.has_return);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_lower_trailing_comment_requires_adjacency() {
        let source = "fn example() {\n    // first\n\n    // Output: last\n}\n";
        let unit = lower_source(source);
        match &find(&unit, "example").kind {
            DeclKind::Function(info) => {
                assert_eq!(info.trailing_comment.as_ref().unwrap().text, "Output: last\n");
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_lower_collects_idents() {
        let unit = lower_source("fn user() { helper(Config::new()); }\n");
        let idents = &find(&unit, "user").idents;
        assert!(idents.contains("helper"));
        assert!(idents.contains("Config"));
    }
}
