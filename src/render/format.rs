use std::path::Path;

use crate::error::Result;
use crate::source::Parser;

/// Check that `source` is a valid Rust file and normalize its layout:
/// trailing whitespace trimmed, leading blank lines dropped, runs of blank
/// lines collapsed, exactly one trailing newline.
pub fn format_source(source: &str) -> Result<String> {
    let parsed = Parser::new().parse_source(source, Path::new("main.rs"))?;
    parsed.check_syntax()?;
    Ok(normalize(source))
}

fn normalize(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 1);
    let mut blank_run = true;
    for line in source.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if !blank_run {
                out.push('\n');
            }
            blank_run = true;
            continue;
        }
        blank_run = false;
        out.push_str(line);
        out.push('\n');
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}
