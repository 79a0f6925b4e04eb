//! Symbols and the tokenizer that splits rule, context and input strings into them.
//!
//! Symbols are separated by whitespace. A bracketed tag such as `[tns = pst]` is a single
//! symbol even if it contains whitespace.
use std::{borrow::Borrow, fmt, iter::Peekable, str::CharIndices};

/// Stands for any symbol that is not part of the alphabet of a transducer
pub const WILDCARD: &str = "?";
/// Marks the start and the end of an input
pub const BOUNDARY: &str = "$";
/// The empty symbol. Input of insertion rules and output of deletion rules
pub const EMPTY: &str = "Ø";
/// The position of the rewritten symbol inside a context
pub const MARKER: &str = "_";
/// How the empty path (and an empty output) is displayed
pub const LAMBDA: &str = "λ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Symbol(s.into())
    }

    pub fn wildcard() -> Self {
        Symbol::new(WILDCARD)
    }

    pub fn boundary() -> Self {
        Symbol::new(BOUNDARY)
    }

    pub fn empty() -> Self {
        Symbol::new(EMPTY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }

    pub fn is_boundary(&self) -> bool {
        self.0 == BOUNDARY
    }

    pub fn is_empty_marker(&self) -> bool {
        self.0 == EMPTY
    }

    pub fn is_marker(&self) -> bool {
        self.0 == MARKER
    }

    /// Sentinels are dropped from the output of a rewrite
    pub fn is_sentinel(&self) -> bool {
        self.is_boundary() || self.is_empty_marker()
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self.0.as_str(), WILDCARD | BOUNDARY | EMPTY | MARKER)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TokenizeError {
    #[error("Unclosed '[' at position {position} in {source_text:?}")]
    UnclosedTag { source_text: String, position: usize },
    #[error("Unexpected ']' at position {position} in {source_text:?}")]
    UnexpectedClose { source_text: String, position: usize },
    #[error("Nested '[' at position {position} in {source_text:?}")]
    NestedTag { source_text: String, position: usize },
}

/// Iterator over the symbols of a whitespace delimited string
pub struct Tokens<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Tokens<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn token(&mut self, start: usize) -> Result<Symbol, TokenizeError> {
        let mut open: Option<usize> = None;
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_whitespace() && open.is_none() {
                break;
            }
            match c {
                '[' if open.is_some() => {
                    return Err(TokenizeError::NestedTag {
                        source_text: self.source.to_string(),
                        position: i,
                    });
                }
                '[' => open = Some(i),
                ']' if open.is_none() => {
                    return Err(TokenizeError::UnexpectedClose {
                        source_text: self.source.to_string(),
                        position: i,
                    });
                }
                ']' => open = None,
                _ => (),
            }
            self.chars.next();
            end = i + c.len_utf8();
        }
        match open {
            Some(position) => Err(TokenizeError::UnclosedTag {
                source_text: self.source.to_string(),
                position,
            }),
            None => Ok(Symbol::new(&self.source[start..end])),
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Symbol, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let &(start, _) = self.chars.peek()?;
        let token = self.token(start);
        if token.is_err() {
            // don't keep producing errors for the rest of the input
            self.chars = self.source[self.source.len()..].char_indices().peekable();
        }
        Some(token)
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Symbol>, TokenizeError> {
    Tokens::new(source).collect()
}

/// Join symbols with single spaces, the inverse of [tokenize]
pub fn join(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
