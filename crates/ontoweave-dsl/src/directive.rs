//! Typed directives parsed from diagram labels.
//!
//! Matching is greedy in the same way on both delimiter kinds: the body ends
//! at the *last* closing delimiter and starts at the last opening delimiter
//! before it. Anything after the closing delimiter is ignored, so
//! `3.5 (m/s)(speed_)` binds `speed_` to `3.5 (m/s)`.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::strip_html;

/// Separates the parts of a directive body (`Base|SelfTerm`).
pub const PART_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiters {
    /// `Head[Body]`
    Brackets,
    /// `Head(Body)`
    Parens,
}

impl Delimiters {
    fn pattern(self) -> &'static Regex {
        static BRACKETS: OnceLock<Regex> = OnceLock::new();
        static PARENS: OnceLock<Regex> = OnceLock::new();
        match self {
            Delimiters::Brackets => BRACKETS
                .get_or_init(|| Regex::new(r"^(.*)\[(.*)\]").expect("static bracket pattern")),
            Delimiters::Parens => PARENS
                .get_or_init(|| Regex::new(r"^(.*)\((.*)\)").expect("static paren pattern")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Delimiters::Brackets => "Head[Body]",
            Delimiters::Parens => "Head(Body)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermParseError {
    #[error("`{text}` does not match {form}")]
    NoMatch { text: String, form: &'static str },

    #[error("`{text}` has {found} part(s), expected {expected}")]
    PartCount {
        text: String,
        found: usize,
        expected: usize,
    },

    #[error("`{text}` has an empty {part}")]
    EmptyPart { text: String, part: &'static str },
}

/// Untyped `Head<open>Part|Part|...<close>` split, after HTML stripping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMapping {
    pub head: String,
    pub parts: Vec<String>,
}

impl TermMapping {
    pub fn parse(raw: &str, delimiters: Delimiters) -> Option<Self> {
        let text = strip_html(raw);
        let caps = delimiters.pattern().captures(&text)?;
        let head = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let body = caps.get(2).map_or("", |m| m.as_str());
        let parts = body
            .split(PART_SEPARATOR)
            .map(|part| part.trim().to_string())
            .collect();
        Some(Self { head, parts })
    }

    fn expect_parts(
        raw: &str,
        delimiters: Delimiters,
        expected: usize,
    ) -> Result<Self, TermParseError> {
        let mapping = Self::parse(raw, delimiters).ok_or_else(|| TermParseError::NoMatch {
            text: strip_html(raw),
            form: delimiters.name(),
        })?;
        if mapping.parts.len() != expected {
            return Err(TermParseError::PartCount {
                text: strip_html(raw),
                found: mapping.parts.len(),
                expected,
            });
        }
        Ok(mapping)
    }
}

/// `Name[BaseOntology|SelfTerm]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantiationDirective {
    pub name: String,
    pub base_ontology: String,
    pub self_term: String,
}

impl InstantiationDirective {
    pub fn parse(raw: &str) -> Result<Self, TermParseError> {
        let mapping = TermMapping::expect_parts(raw, Delimiters::Brackets, 2)?;
        let mut parts = mapping.parts.into_iter();
        let base_ontology = parts.next().unwrap_or_default();
        let self_term = parts.next().unwrap_or_default();
        let directive = Self {
            name: mapping.head,
            base_ontology,
            self_term,
        };
        directive.check_non_empty(raw)?;
        Ok(directive)
    }

    fn check_non_empty(&self, raw: &str) -> Result<(), TermParseError> {
        for (value, part) in [
            (&self.name, "instance name"),
            (&self.base_ontology, "base ontology"),
            (&self.self_term, "self term"),
        ] {
            if value.is_empty() {
                return Err(TermParseError::EmptyPart {
                    text: strip_html(raw),
                    part,
                });
            }
        }
        Ok(())
    }
}

/// `Value(Variable)`: the target of `define` and `link` edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDirective {
    pub value: String,
    pub variable: String,
}

impl BindingDirective {
    pub fn parse(raw: &str) -> Result<Self, TermParseError> {
        let mapping = TermMapping::expect_parts(raw, Delimiters::Parens, 1)?;
        let variable = mapping.parts.into_iter().next().unwrap_or_default();
        if variable.is_empty() {
            return Err(TermParseError::EmptyPart {
                text: strip_html(raw),
                part: "variable",
            });
        }
        Ok(Self {
            value: mapping.head,
            variable,
        })
    }
}
