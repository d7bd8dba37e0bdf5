//! Comment marker stripping and text normalization.

use once_cell::sync::Lazy;
use regex::Regex;

static DOC_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^#(!)?\[\s*doc\s*=\s*"((?:[^"\\]|\\.)*)"\s*\]$"#).expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `///` or `/** */`
    OuterDoc,
    /// `//!` or `/*! */`
    InnerDoc,
    Plain,
}

/// Classify a raw comment and return its lines with markers removed
pub fn split_comment(raw: &str) -> (CommentKind, Vec<String>) {
    let raw = raw.trim_end_matches(['\n', '\r']);

    if let Some(rest) = raw.strip_prefix("//") {
        let (kind, content) = if rest.starts_with('/') && !rest.starts_with("//") {
            (CommentKind::OuterDoc, &rest[1..])
        } else if let Some(content) = rest.strip_prefix('!') {
            (CommentKind::InnerDoc, content)
        } else {
            (CommentKind::Plain, rest)
        };
        let content = content.strip_prefix(' ').unwrap_or(content);
        return (kind, vec![content.to_string()]);
    }

    if let Some(rest) = raw.strip_prefix("/*") {
        let rest = rest.strip_suffix("*/").unwrap_or(rest);
        let (kind, body) = if rest.starts_with('*') && !rest.starts_with("**") && !rest.is_empty()
        {
            (CommentKind::OuterDoc, &rest[1..])
        } else if let Some(body) = rest.strip_prefix('!') {
            (CommentKind::InnerDoc, body)
        } else {
            (CommentKind::Plain, rest)
        };
        return (kind, block_lines(body));
    }

    (CommentKind::Plain, vec![raw.to_string()])
}

fn block_lines(body: &str) -> Vec<String> {
    body.lines()
        .enumerate()
        .map(|(i, line)| {
            let trimmed = line.trim_start();
            if i > 0 && trimmed.starts_with('*') {
                let rest = &trimmed[1..];
                rest.strip_prefix(' ').unwrap_or(rest).to_string()
            } else if i == 0 {
                line.strip_prefix(' ').unwrap_or(line).to_string()
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// Parse `#[doc = "..."]` or `#![doc = "..."]`, returning `(is_inner, text)`
pub fn doc_attribute(raw: &str) -> Option<(bool, String)> {
    let caps = DOC_ATTRIBUTE.captures(raw.trim())?;
    let inner = caps.get(1).is_some();
    let value = caps.get(2).map(|m| unescape(m.as_str())).unwrap_or_default();
    Some((inner, value.strip_prefix(' ').unwrap_or(&value).to_string()))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Join comment lines into normalized text.
///
/// Trailing whitespace is trimmed on each line, leading and trailing blank
/// lines are removed and runs of blank lines collapse into one. Non-empty
/// results end with a single `\n`.
pub fn comment_text<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for chunk in lines {
        for line in chunk.as_ref().split('\n') {
            let line = line.trim_end();
            if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
                continue;
            }
            out.push(line.to_string());
        }
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    if out.is_empty() {
        return String::new();
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}
