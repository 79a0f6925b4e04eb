use std::fmt;

use enumset::{EnumSet, EnumSetType};

use super::{
    RuleError,
    symbol::{self, Symbol, tokenize},
};

/// Where the rewritten symbol sits relative to its context
#[derive(EnumSetType, Debug)]
pub enum ContextType {
    /// No context at all, the rule fires everywhere
    Free,
    /// Context to the left of the marker, e.g. `a b _`
    Left,
    /// Context to the right of the marker, e.g. `_ a b`
    Right,
    /// Context on both sides of the marker, e.g. `a _ b`
    Dual,
}

pub type ContextTypes = EnumSet<ContextType>;

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextType::Free => write!(f, "free"),
            ContextType::Left => write!(f, "left"),
            ContextType::Right => write!(f, "right"),
            ContextType::Dual => write!(f, "dual"),
        }
    }
}

/// A parsed context of the form `LEFT _ RIGHT`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Context {
    left: Vec<Symbol>,
    right: Vec<Symbol>,
}

impl Context {
    pub fn new(left: Vec<Symbol>, right: Vec<Symbol>) -> Self {
        Self { left, right }
    }

    /// The context of a context free rule, i.e. `_`
    pub fn free() -> Self {
        Self::default()
    }

    pub fn parse(source: &str) -> Result<Self, RuleError> {
        let symbols = tokenize(source)?;
        let markers = symbols.iter().filter(|s| s.is_marker()).count();
        if markers != 1 {
            return Err(RuleError::MarkerCount {
                context: source.to_string(),
                found: markers,
            });
        }
        let split = symbols.iter().position(Symbol::is_marker).unwrap_or(0);
        let context = Self {
            left: symbols[..split].to_vec(),
            right: symbols[split + 1..].to_vec(),
        };
        context.validate(source)?;
        Ok(context)
    }

    fn validate(&self, source: &str) -> Result<(), RuleError> {
        let last = self.right.len().saturating_sub(1);
        let left = self.left.iter().enumerate().map(|(i, s)| (i == 0, s));
        let right = self.right.iter().enumerate().map(|(i, s)| (i == last, s));
        for (at_edge, symbol) in left.chain(right) {
            if symbol.is_boundary() {
                if !at_edge {
                    return Err(RuleError::MisplacedBoundary {
                        context: source.to_string(),
                    });
                }
            } else if symbol.is_reserved() {
                return Err(RuleError::ReservedSymbol {
                    symbol: symbol.to_string(),
                    place: source.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn left(&self) -> &[Symbol] {
        &self.left
    }

    pub fn right(&self) -> &[Symbol] {
        &self.right
    }

    pub fn context_type(&self) -> ContextType {
        match (self.left.is_empty(), self.right.is_empty()) {
            (true, true) => ContextType::Free,
            (false, true) => ContextType::Left,
            (true, false) => ContextType::Right,
            (false, false) => ContextType::Dual,
        }
    }

    /// The context as seen by an insertion rule: the input of an insertion is interleaved with
    /// [EMPTY](symbol::EMPTY) symbols, so the context has to be as well
    pub fn interleaved(&self) -> Self {
        Self {
            left: interleave(&self.left),
            right: interleave(&self.right),
        }
    }
}

/// Put an [EMPTY](symbol::EMPTY) symbol between every two symbols
pub fn interleave(symbols: &[Symbol]) -> Vec<Symbol> {
    let mut interleaved = Vec::with_capacity((symbols.len() * 2).saturating_sub(1));
    for (i, s) in symbols.iter().enumerate() {
        if i > 0 {
            interleaved.push(Symbol::empty());
        }
        interleaved.push(s.clone());
    }
    interleaved
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.left.is_empty() {
            parts.push(symbol::join(&self.left));
        }
        parts.push(symbol::MARKER.to_string());
        if !self.right.is_empty() {
            parts.push(symbol::join(&self.right));
        }
        write!(f, "{}", parts.join(" "))
    }
}
