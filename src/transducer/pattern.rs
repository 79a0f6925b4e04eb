//! The matching model shared by all parts of the construction.
//!
//! Every combination of a context and a pair is turned into a [Pattern]: the left context,
//! the input symbol and the right context in one sequence, with the position of the input
//! symbol as the `focus`. A symbol of the input is rewritten if it is the focus of an
//! occurrence of some pattern in the input. All outputs of the transducer are derived from
//! this definition, so the generators, the fallback edges and the finals agree on what
//! has to be written and when.
use std::{collections::BTreeSet, ops::Range};

use crate::parser::{ContextType, RuleSet, Symbol};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    symbols: Vec<Symbol>,
    focus: usize,
    output: Symbol,
}

impl Pattern {
    pub fn new(left: &[Symbol], input: Symbol, right: &[Symbol], output: Symbol) -> Self {
        let mut symbols = left.to_vec();
        symbols.push(input);
        symbols.extend_from_slice(right);
        Self {
            symbols,
            focus: left.len(),
            output,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn output(&self) -> &Symbol {
        &self.output
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Does `path` match the beginning of this pattern without completing it, with the
    /// focus already seen?
    fn is_live(&self, path: &[Symbol]) -> bool {
        path.len() < self.len() && path.len() > self.focus && self.symbols.starts_with(path)
    }

    /// Where an occurrence with its focus on `position` would start
    fn start_for(&self, position: usize) -> Option<usize> {
        position.checked_sub(self.focus)
    }
}

/// The output computed for a range of a window
#[derive(Debug, Default, PartialEq)]
pub struct Settled {
    pub output: Vec<Symbol>,
    pub rewritten: bool,
}

#[derive(Debug, Default)]
pub struct Patterns {
    patterns: Vec<Pattern>,
}

impl Patterns {
    pub fn compile(rules: &RuleSet) -> Self {
        let patterns = match rules.context_type() {
            ContextType::Free => rules
                .pairs()
                .iter()
                .map(|p| Pattern::new(&[], p.input(), &[], p.output()))
                .collect(),
            ContextType::Left | ContextType::Right | ContextType::Dual => rules
                .matching_contexts()
                .iter()
                .flat_map(|c| {
                    rules
                        .pairs()
                        .iter()
                        .map(|p| Pattern::new(c.left(), p.input(), c.right(), p.output()))
                        .collect::<Vec<_>>()
                })
                .collect(),
        };
        Self { patterns }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// All symbols that occur in some pattern
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.patterns
            .iter()
            .flat_map(|p| p.symbols.iter().cloned())
            .collect()
    }

    /// How many symbols at the start of `path` can be written out already.
    ///
    /// A symbol has to be held back as long as some partial match that ends the path has
    /// seen its focus: whether that focus gets rewritten depends on input that is yet to
    /// come. Symbols before the focus of the earliest such match are final.
    pub fn consumed_left_len(&self, path: &[Symbol]) -> usize {
        let mut consumed = path.len();
        for start in 0..path.len() {
            for pattern in self.patterns.iter() {
                if pattern.is_live(&path[start..]) {
                    consumed = consumed.min(start + pattern.focus);
                }
            }
        }
        consumed
    }

    /// The pattern occurrence in `window` that has its focus on `position`, if any.
    /// Returns the pattern and the start of the occurrence.
    pub fn occurrence(&self, window: &[Symbol], position: usize) -> Option<(&Pattern, usize)> {
        self.patterns.iter().find_map(|pattern| {
            let start = pattern.start_for(position)?;
            let end = start + pattern.len();
            (end <= window.len() && window[start..end] == pattern.symbols[..])
                .then_some((pattern, start))
        })
    }

    /// The output for the symbols of `window` in `range`: the rewritten symbol where an
    /// occurrence inside the window has its focus, the symbol itself otherwise
    pub fn settle(&self, window: &[Symbol], range: Range<usize>) -> Settled {
        let mut settled = Settled::default();
        for position in range {
            match self.occurrence(window, position) {
                Some((pattern, _)) => {
                    settled.output.push(pattern.output.clone());
                    settled.rewritten = true;
                }
                None => settled.output.push(window[position].clone()),
            }
        }
        settled
    }
}
