//! Generators for the "happy path" of each context type.
//!
//! They walk the contexts of a rule set and add one state per context prefix, the edges that
//! advance along the context, the edge that performs the rewrite once the context is
//! complete and a wildcard edge for every state they visit. Edges that complete a context and
//! wildcard edges lead back to the initial state. They are only provisional: the
//! [prefix](super::prefix) generator replaces them with edges to the longest matching
//! partial context.
use crate::parser::{Context, ContextType, Pair, RuleSet, Symbol};

use super::{
    pattern::Patterns,
    state::{Edge, StateId, States},
};

pub struct Generator<'a> {
    patterns: &'a Patterns,
    states: &'a mut States,
}

impl<'a> Generator<'a> {
    pub fn new(patterns: &'a Patterns, states: &'a mut States) -> Self {
        Self { patterns, states }
    }

    fn window(&self, start: StateId, symbol: &Symbol) -> Vec<Symbol> {
        let mut window = self.states.state(start).path().to_vec();
        window.push(symbol.clone());
        window
    }

    /// Advance from `start` to the state for its path extended by `symbol`
    fn advance(&mut self, start: StateId, symbol: &Symbol) -> (Edge, StateId) {
        let window = self.window(start, symbol);
        let end = self.states.intern(&window, self.patterns);
        let from = self.states.state(start).consumed_left_len();
        let to = self.states.state(end).consumed_left_len();
        let settled = self.patterns.settle(&window, from..to);
        let edge = Edge {
            start,
            input: symbol.clone(),
            output: settled.output,
            end,
            is_transduction: settled.rewritten,
        };
        (edge, end)
    }

    /// Return from `start` to the initial state, writing everything that was held back
    fn provisional(&self, start: StateId, symbol: &Symbol) -> Edge {
        let window = self.window(start, symbol);
        let from = self.states.state(start).consumed_left_len();
        let settled = self.patterns.settle(&window, from..window.len());
        Edge {
            start,
            input: symbol.clone(),
            output: settled.output,
            end: States::INITIAL,
            is_transduction: settled.rewritten,
        }
    }

    /// Walk `symbols` from `start`. Returns the state reached at the end.
    fn chain(&mut self, start: StateId, symbols: &[Symbol], edges: &mut Vec<Edge>) -> StateId {
        let mut current = start;
        for symbol in symbols {
            edges.push(self.provisional(current, &Symbol::wildcard()));
            let (edge, end) = self.advance(current, symbol);
            edges.push(edge);
            current = end;
        }
        current
    }

    /// A self loop on the initial state for every pair
    pub fn context_free(&mut self, pairs: &[Pair]) -> Vec<Edge> {
        let mut edges = vec![self.provisional(States::INITIAL, &Symbol::wildcard())];
        for pair in pairs {
            edges.push(self.provisional(States::INITIAL, &pair.input()));
        }
        edges
    }

    /// The left context is echoed as it is read, the input symbol following it is rewritten
    pub fn left(&mut self, pairs: &[Pair], context: &Context) -> Vec<Edge> {
        let mut edges = Vec::new();
        let end = self.chain(States::INITIAL, context.left(), &mut edges);
        edges.push(self.provisional(end, &Symbol::wildcard()));
        for pair in pairs {
            edges.push(self.provisional(end, &pair.input()));
        }
        edges
    }

    /// The input symbol and the right context are held back until the last symbol of the
    /// context is read. The chain starts at `start`, which is the initial state for a right
    /// context and the end of the left chain for a dual context.
    pub fn right(&mut self, pairs: &[Pair], context: &Context, start: StateId) -> Vec<Edge> {
        let mut edges = Vec::new();
        let Some((last, init)) = context.right().split_last() else {
            return edges;
        };
        edges.push(self.provisional(start, &Symbol::wildcard()));
        for pair in pairs {
            let (edge, next) = self.advance(start, &pair.input());
            edges.push(edge);
            let end = self.chain(next, init, &mut edges);
            edges.push(self.provisional(end, &Symbol::wildcard()));
            edges.push(self.provisional(end, last));
        }
        edges
    }

    /// A left chain followed by a right chain
    pub fn dual(&mut self, pairs: &[Pair], context: &Context) -> Vec<Edge> {
        let mut edges = Vec::new();
        let end = self.chain(States::INITIAL, context.left(), &mut edges);
        edges.extend(self.right(pairs, context, end));
        edges
    }
}

/// Generate the happy path edges for all contexts of `rules`
pub fn generate(rules: &RuleSet, patterns: &Patterns, states: &mut States) -> Vec<Edge> {
    let mut generator = Generator::new(patterns, states);
    let pairs = rules.pairs();
    let contexts = rules.matching_contexts();
    match rules.context_type() {
        ContextType::Free => generator.context_free(pairs),
        ContextType::Left => contexts
            .iter()
            .flat_map(|c| generator.left(pairs, c))
            .collect(),
        ContextType::Right => contexts
            .iter()
            .flat_map(|c| generator.right(pairs, c, States::INITIAL))
            .collect(),
        ContextType::Dual => contexts
            .iter()
            .flat_map(|c| generator.dual(pairs, c))
            .collect(),
    }
}
