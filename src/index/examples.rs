//! Example discovery in test-designated files.
//!
//! An example is a top-level `fn example()` or `fn example_<suffix>()` with no
//! parameters and no return type. Its body's last comment group may record
//! the expected output:
//!
//! ```text
//! fn example_slice() {
//!     println!("{}", lookup("Foo[0]"));
//!     // Output:
//!     // First sentence.
//! }
//! ```

use std::collections::BTreeSet;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::IndexConfig;
use crate::source::{DeclKind, Declaration, FnInfo, SourceUnit};

static OUTPUT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(unordered )?output:").expect("valid regex"));

/// Paths that reach outside the example file
const CRATE_RELATIVE: [&str; 3] = ["crate::", "super::", "self::"];

#[derive(Debug, Clone)]
pub struct Example {
    /// Index key: `"Example" + name`
    pub key: String,
    /// Declared name after the prefix, in UpperCamelCase
    pub name: String,
    pub doc: String,
    /// The body block, or the whole file for a whole-file example
    pub code: String,
    pub is_block: bool,
    pub output: Option<String>,
    /// Byte span of the output comment within `code`
    pub output_span: Option<Range<usize>>,
    pub unordered: bool,
    /// Self-contained program, when the example does not depend on its crate
    pub play: Option<String>,
}

/// Collect the examples declared in one test-designated file
pub fn extract(unit: &SourceUnit, config: &IndexConfig) -> Vec<Example> {
    let candidates: Vec<(&Declaration, &FnInfo, Range<usize>, String)> = unit
        .decls
        .iter()
        .filter_map(|d| {
            let DeclKind::Function(info) = &d.kind else {
                return None;
            };
            if info.has_params || info.has_return || info.is_test {
                return None;
            }
            let body = info.body.clone()?;
            let name = example_name(&d.name, &config.example_prefix)?;
            Some((d, info, body, name))
        })
        .collect();

    let whole_file = candidates.len() == 1 && is_whole_file(unit, candidates[0].0);

    candidates
        .into_iter()
        .map(|(decl, info, body, name)| {
            let (output, unordered) = recorded_output(info);
            let offset = if whole_file { 0 } else { body.start };
            let output_span = output_comment(info).map(|(_, _, span)| {
                span.start.saturating_sub(offset)..span.end.saturating_sub(offset)
            });
            let play = if whole_file {
                whole_file_play(unit, info)
            } else {
                play_program(unit, decl, info, &body, config)
            };
            Example {
                key: format!("Example{}", name),
                name,
                doc: decl.doc.clone(),
                code: if whole_file {
                    unit.source.clone()
                } else {
                    unit.text(&body).to_string()
                },
                is_block: !whole_file,
                output,
                output_span,
                unordered,
                play,
            }
        })
        .collect()
}

/// `example` -> `""`, `example_doc_slice` -> `"DocSlice"`
pub fn example_name(fn_name: &str, prefix: &str) -> Option<String> {
    let rest = fn_name.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some(String::new());
    }
    let suffix = rest.strip_prefix('_')?;
    if suffix.is_empty() {
        return None;
    }
    Some(
        suffix
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect(),
    )
}

/// One example, no tests or benches, and at least one other non-`use` item
fn is_whole_file(unit: &SourceUnit, example: &Declaration) -> bool {
    let has_tests = unit
        .decls
        .iter()
        .any(|d| matches!(&d.kind, DeclKind::Function(info) if info.is_test));
    let has_other = unit
        .decls
        .iter()
        .any(|d| !std::ptr::eq(d, example) && !matches!(d.kind, DeclKind::Use { .. }));
    !has_tests && has_other
}

fn output_comment(info: &FnInfo) -> Option<(&str, bool, Range<usize>)> {
    let trailing = info.trailing_comment.as_ref()?;
    let caps = OUTPUT_PREFIX.captures(&trailing.text)?;
    let end = caps.get(0)?.end();
    Some((
        &trailing.text[end..],
        caps.get(1).is_some(),
        trailing.span.clone(),
    ))
}

fn recorded_output(info: &FnInfo) -> (Option<String>, bool) {
    match output_comment(info) {
        Some((text, unordered, _)) => {
            let text = text.trim_start_matches(' ');
            let text = text.strip_prefix('\n').unwrap_or(text);
            (Some(text.to_string()), unordered)
        }
        None => (None, false),
    }
}

/// `source[range]` with the output comment cut out
fn without_output(unit: &SourceUnit, range: &Range<usize>, info: &FnInfo) -> String {
    match output_comment(info) {
        Some((_, _, cut)) if cut.start >= range.start && cut.end <= range.end => {
            let mut text = unit.text(&(range.start..cut.start)).to_string();
            text.push_str(unit.text(&(cut.end..range.end)));
            text
        }
        _ => unit.text(range).to_string(),
    }
}

fn is_crate_relative(text: &str) -> bool {
    CRATE_RELATIVE.iter().any(|p| text.contains(p))
}

fn uses_are_external(unit: &SourceUnit) -> bool {
    unit.uses().all(|u| match &u.kind {
        DeclKind::Use { path } => {
            !["crate", "super", "self"]
                .iter()
                .any(|root| path == root || path.starts_with(&format!("{}::", root)))
        }
        _ => true,
    })
}

/// The file's `use` declarations, the items the example body reaches
/// (transitively, impls following their host type), then `fn main()`.
fn play_program(
    unit: &SourceUnit,
    example: &Declaration,
    info: &FnInfo,
    body: &Range<usize>,
    config: &IndexConfig,
) -> Option<String> {
    if !uses_are_external(unit) {
        return None;
    }
    let body_text = without_output(unit, body, info);
    if is_crate_relative(&body_text) {
        return None;
    }

    let mut wanted: BTreeSet<String> = example.idents.clone();
    let mut included = vec![false; unit.decls.len()];
    loop {
        let mut changed = false;
        for (i, decl) in unit.decls.iter().enumerate() {
            if included[i] || std::ptr::eq(decl, example) {
                continue;
            }
            let referenced = match &decl.kind {
                DeclKind::Use { .. } => false,
                DeclKind::Function(f) => {
                    !f.is_test
                        && example_name(&decl.name, &config.example_prefix).is_none()
                        && wanted.contains(&decl.name)
                }
                DeclKind::Impl { host, .. } => wanted.contains(host.base_name()),
                _ => !decl.name.is_empty() && wanted.contains(&decl.name),
            };
            if referenced {
                included[i] = true;
                wanted.extend(decl.idents.iter().cloned());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut out = String::new();
    let mut has_uses = false;
    for u in unit.uses() {
        out.push_str(unit.text(&u.span));
        out.push('\n');
        has_uses = true;
    }
    if has_uses {
        out.push('\n');
    }
    for (decl, _) in unit.decls.iter().zip(&included).filter(|(_, inc)| **inc) {
        let text = unit.text(&decl.span);
        if is_crate_relative(text) {
            return None;
        }
        out.push_str(text);
        out.push_str("\n\n");
    }
    out.push_str("fn main() ");
    out.push_str(&body_text);
    out.push('\n');
    Some(out)
}

/// The whole file with the example renamed to `main`
fn whole_file_play(unit: &SourceUnit, info: &FnInfo) -> Option<String> {
    if !uses_are_external(unit) {
        return None;
    }
    let name = info.name_span.clone();
    let rest = name.end..unit.source.len();

    let mut out = unit.text(&(0..name.start)).to_string();
    out.push_str("main");
    out.push_str(&without_output(unit, &rest, info));
    if is_crate_relative(&out) {
        return None;
    }
    Some(out)
}
