//! Allow-list matching against a captured call stack.
//!
//! A single (pattern, frame) match anywhere in the stack exempts the whole
//! deprecation notice. An empty allow-list never exempts anything.

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Upper bound for the compiled size of a pattern built from text.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// One allow-list entry.
#[derive(Debug, Clone)]
pub enum AllowPattern {
    /// Matches when the text occurs anywhere in a frame.
    Literal(String),
    /// Matches when the expression matches anywhere in a frame.
    Regex(Regex),
}

impl AllowPattern {
    /// Compiles `pattern` as a regular expression.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidPattern`] if the expression is malformed or too large.
    pub fn regex(pattern: &str) -> Result<Self, ConfigError> {
        RegexBuilder::new(pattern)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map(Self::Regex)
            .map_err(|source| ConfigError::InvalidPattern { pattern: pattern.to_owned(), source })
    }

    #[must_use]
    pub fn is_match(&self, frame: &str) -> bool {
        match self {
            Self::Literal(text) => frame.contains(text.as_str()),
            Self::Regex(regex) => regex.is_match(frame),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Regex(regex) => regex.as_str(),
        }
    }
}

impl fmt::Display for AllowPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "{text:?}"),
            Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for AllowPattern {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_owned())
    }
}

impl From<String> for AllowPattern {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl From<Regex> for AllowPattern {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl From<&Regex> for AllowPattern {
    fn from(regex: &Regex) -> Self {
        Self::Regex(regex.clone())
    }
}

/// Returns `true` iff at least one pattern matches at least one frame.
pub fn allowed<S: AsRef<str>>(patterns: &[AllowPattern], frames: &[S]) -> bool {
    patterns
        .iter()
        .any(|pattern| frames.iter().any(|frame| pattern.is_match(frame.as_ref())))
}

/// Ordered collection of [`AllowPattern`]s supplied with a single deprecation call.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    patterns: Vec<AllowPattern>,
}

impl AllowList {
    #[must_use]
    pub const fn new() -> Self {
        Self { patterns: Vec::new() }
    }

    /// Appends a literal substring pattern.
    #[must_use]
    pub fn literal(mut self, text: impl Into<String>) -> Self {
        self.patterns.push(AllowPattern::Literal(text.into()));
        self
    }

    /// Appends a regular expression compiled from `pattern`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidPattern`] if the expression does not compile.
    pub fn regex(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.patterns.push(AllowPattern::regex(pattern)?);
        Ok(self)
    }

    pub fn push(&mut self, pattern: impl Into<AllowPattern>) {
        self.patterns.push(pattern.into());
    }

    #[must_use]
    pub fn patterns(&self) -> &[AllowPattern] {
        &self.patterns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns `true` if any frame of `frames` is covered by this list.
    #[must_use]
    pub fn allows<S: AsRef<str>>(&self, frames: &[S]) -> bool {
        allowed(&self.patterns, frames)
    }
}

impl<P: Into<AllowPattern>> FromIterator<P> for AllowList {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self { patterns: iter.into_iter().map(Into::into).collect() }
    }
}

impl From<Vec<AllowPattern>> for AllowList {
    fn from(patterns: Vec<AllowPattern>) -> Self {
        Self { patterns }
    }
}
