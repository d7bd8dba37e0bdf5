//! Sentence slicing of doc text.
//!
//! A slice spec is a comma separated list of tokens, each `i`, `i:j`, `i:`
//! or `:j`, selecting zero-based sentences. Ranges are half-open and tokens
//! are applied in the order written:
//!
//! ```
//! use doc_excerpt::slice::resolve;
//!
//! let text = "Parses input. Builds the index. Serves lookups.";
//! assert_eq!(resolve("f[0,2:]", "0,2:", text).unwrap(), "Parses input. Serves lookups.");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DocError, Result};

const TERMINATOR: char = '.';

static BOTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):(\d+)$").expect("valid regex"));
static FROM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):$").expect("valid regex"));
static TO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:(\d+)$").expect("valid regex"));
static SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)$").expect("valid regex"));

/// One parsed token of a slice spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// `i`
    Single(usize),
    /// `i:j`
    Range(usize, usize),
    /// `i:`
    From(usize),
    /// `:j`
    To(usize),
}

impl Section {
    pub fn parse(token: &str, full: &str) -> Result<Self> {
        let syntax = || DocError::SpecSyntax {
            token: token.to_string(),
            spec: full.to_string(),
        };
        let num = |caps: &regex::Captures, i: usize| -> Result<usize> {
            caps[i].parse().map_err(|_| syntax())
        };

        if let Some(caps) = BOTH.captures(token) {
            Ok(Section::Range(num(&caps, 1)?, num(&caps, 2)?))
        } else if let Some(caps) = FROM.captures(token) {
            Ok(Section::From(num(&caps, 1)?))
        } else if let Some(caps) = TO.captures(token) {
            Ok(Section::To(num(&caps, 1)?))
        } else if let Some(caps) = SINGLE.captures(token) {
            Ok(Section::Single(num(&caps, 1)?))
        } else {
            Err(syntax())
        }
    }

    fn bounds(&self) -> (Option<usize>, Option<usize>) {
        match *self {
            Section::Single(i) | Section::From(i) => (Some(i), None),
            Section::Range(i, j) => (Some(i), Some(j)),
            Section::To(j) => (None, Some(j)),
        }
    }

    /// Bounds are checked against the sentence count before slicing. Note
    /// that an explicit end must itself be a valid index.
    pub fn check(&self, len: usize, full: &str) -> Result<()> {
        let out_of_range = |index: usize| DocError::OutOfRange {
            index,
            len,
            spec: full.to_string(),
        };
        let (start, end) = self.bounds();

        if end == Some(0) {
            return Err(out_of_range(0));
        }
        if let Some(start) = start.filter(|&s| s >= len) {
            return Err(out_of_range(start));
        }
        if let Some(end) = end.filter(|&e| e >= len) {
            return Err(out_of_range(end));
        }
        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                return Err(DocError::Order {
                    start,
                    end,
                    spec: full.to_string(),
                });
            }
        }
        Ok(())
    }

    fn select<'a>(&self, sentences: &'a [&'a str]) -> &'a [&'a str] {
        match *self {
            Section::Single(i) => &sentences[i..=i],
            Section::Range(i, j) => &sentences[i..j],
            Section::From(i) => &sentences[i..],
            Section::To(j) => &sentences[..j],
        }
    }
}

fn is_blank(sentence: &str) -> bool {
    sentence.trim_matches([' ', '\n']).is_empty()
}

/// Candidates between terminators, dropping the blank ones. Surviving
/// sentences keep their surrounding whitespace.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(TERMINATOR).filter(|s| !is_blank(s)).collect()
}

/// Resolve `slice_spec` against `text`. `full` is the whole expression as
/// written and only appears in error messages.
pub fn resolve(full: &str, slice_spec: &str, text: &str) -> Result<String> {
    let sentences = sentences(text);

    let mut out = String::new();
    for token in slice_spec.split(',') {
        let section = Section::parse(token, full)?;
        section.check(sentences.len(), full)?;
        for sentence in section.select(&sentences) {
            if !is_blank(sentence) {
                out.push_str(sentence);
                out.push(TERMINATOR);
            }
        }
    }
    Ok(out.trim_matches(' ').to_string())
}
