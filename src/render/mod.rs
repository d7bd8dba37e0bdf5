//! Presentation of indexed examples.

pub mod format;

use std::ops::Range;

use crate::config::RenderConfig;
use crate::error::{DocError, Result};
use crate::index::{DocIndex, Example};

/// Renders examples of one built index
pub struct ExampleRenderer<'a> {
    index: &'a DocIndex,
    config: RenderConfig,
}

impl<'a> ExampleRenderer<'a> {
    pub fn new(index: &'a DocIndex, config: RenderConfig) -> Self {
        Self { index, config }
    }

    pub fn example(&self, name: &str) -> Result<ExampleHandle<'_>> {
        Ok(ExampleHandle {
            example: self.index.example(name)?,
            config: &self.config,
        })
    }

    pub fn code(&self, name: &str, annotated: bool) -> Result<String> {
        Ok(self.example(name)?.code(annotated))
    }

    pub fn output(&self, name: &str) -> Result<String> {
        Ok(self.example(name)?.output())
    }

    pub fn playground(&self, name: &str) -> Result<String> {
        self.example(name)?.playground()
    }
}

/// A looked-up example ready for rendering
#[derive(Debug, Clone, Copy)]
pub struct ExampleHandle<'a> {
    example: &'a Example,
    config: &'a RenderConfig,
}

impl<'a> ExampleHandle<'a> {
    pub fn key(&self) -> &'a str {
        &self.example.key
    }

    pub fn name(&self) -> &'a str {
        &self.example.name
    }

    pub fn example(&self) -> &'a Example {
        self.example
    }

    pub fn unordered(&self) -> bool {
        self.example.unordered
    }

    /// Plain: the captured code without its output comment. Annotated: the
    /// block contents dedented one level inside a fenced code block.
    pub fn code(&self, annotated: bool) -> String {
        if !annotated {
            let code = strip_output(&self.example.code, self.example.output_span.as_ref());
            return fix_closing_brace(code);
        }

        let code = self.example.code.as_str();
        let body = match code.strip_prefix('{').and_then(|c| c.strip_suffix('}')) {
            Some(inner) if self.example.is_block => inner
                .replace(&format!("\n{}", self.config.indent), "\n")
                .trim()
                .to_string(),
            _ => code.to_string(),
        };
        format!(
            "```{}\n{}\n```",
            self.config.fence_language,
            body.trim_matches('\n')
        )
    }

    /// Recorded output, empty when the example recorded none
    pub fn output(&self) -> String {
        self.example
            .output
            .as_deref()
            .unwrap_or("")
            .trim_matches('\n')
            .to_string()
    }

    pub fn playground(&self) -> Result<String> {
        let render_error = |reason: String| DocError::Render {
            name: self.example.key.clone(),
            reason,
        };
        let play = self
            .example
            .play
            .as_deref()
            .ok_or_else(|| render_error("example is not self-contained".to_string()))?;

        let out = format::format_source(play).map_err(|e| render_error(e.to_string()))?;
        match out.strip_suffix("\n\n}\n") {
            Some(head) => Ok(format!("{}\n}}", head)),
            None => Ok(out),
        }
    }
}

/// Cut the recorded output comment out of `code`, joining what precedes it
/// with what follows (the closing brace of a block, or the rest of a file).
fn strip_output(code: &str, span: Option<&Range<usize>>) -> String {
    let Some(span) = span.filter(|s| s.start <= s.end && s.end <= code.len()) else {
        return code.to_string();
    };
    let head = code[..span.start].trim_end_matches([' ', '\t']);
    let head = head.strip_suffix('\n').unwrap_or(head);
    format!("{}{}", head, &code[span.end..])
}

/// `"...\n\n}"` -> `"...\n}"`
fn fix_closing_brace(code: String) -> String {
    if let Some(head) = code.strip_suffix("\n}") {
        let head = head.trim_end_matches([' ', '\t']);
        if head.ends_with('\n') {
            return format!("{}}}", head);
        }
    }
    code
}
