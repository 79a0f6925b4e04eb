//! Completion of the transducer with prefix (fallback) edges.
//!
//! From a state `q` on a symbol `s` the transducer moves to the state whose path is the
//! longest suffix of `q.path + s`, the failure link of an Aho-Corasick automaton. The output
//! of such an edge is everything that was held back in `q` or read with `s` and that the
//! destination doesn't hold back anymore.
use std::collections::HashSet;

use log::debug;

use crate::parser::Symbol;

use super::{
    pattern::Patterns,
    state::{Edge, StateId, States},
};

fn extended_path(states: &States, start: StateId, symbol: &Symbol) -> Vec<Symbol> {
    let mut window = states.state(start).path().to_vec();
    window.push(symbol.clone());
    window
}

/// Where the symbols that the state for the longest suffix of `window` holds back begin
fn pending_start(states: &States, window: &[Symbol], end: StateId) -> usize {
    let state = states.state(end);
    window.len() - state.pending().len()
}

/// The carry state needed when moving on `window` to `end`, if any.
///
/// If a symbol that `end` still holds back is the focus of a complete pattern occurrence
/// that starts before the path of `end`, `end` has forgotten that the symbol has to be
/// rewritten. This happens when contexts of different length overlap. The carry state is
/// the suffix of the window that starts with the earliest such occurrence.
fn carry(patterns: &Patterns, states: &States, window: &[Symbol], end: StateId) -> Option<usize> {
    let path_start = window.len() - states.state(end).path().len();
    (pending_start(states, window, end)..window.len())
        .filter_map(|position| patterns.occurrence(window, position))
        .map(|(_, start)| start)
        .filter(|&start| start < path_start)
        .min()
}

/// Add the carry states until every fallback remembers the rewrites it has confirmed
pub fn close(patterns: &Patterns, states: &mut States, alphabet: &[Symbol]) {
    loop {
        let before = states.len();
        for start in 0..states.len() {
            for symbol in alphabet {
                let window = extended_path(states, start, symbol);
                let end = states.longest_suffix(&window);
                if let Some(carry_start) = carry(patterns, states, &window, end) {
                    let path = &window[carry_start..];
                    if states.get(path).is_none() {
                        let id = states.intern(path, patterns);
                        debug!("Added carry state {}", states.state(id));
                    }
                }
            }
        }
        if states.len() == before {
            break;
        }
    }
}

/// The prefix edge from `start` on `symbol`
pub fn fallback(patterns: &Patterns, states: &States, start: StateId, symbol: &Symbol) -> Edge {
    let window = extended_path(states, start, symbol);
    let end = states.longest_suffix(&window);
    let from = states.state(start).consumed_left_len();
    let to = pending_start(states, &window, end);
    debug_assert!(
        from <= to,
        "{} on {} writes more than it has read",
        states.state(start),
        symbol
    );
    let settled = patterns.settle(&window, from..to);
    Edge {
        start,
        input: symbol.clone(),
        output: settled.output,
        end,
        is_transduction: settled.rewritten,
    }
}

/// Prefix edges for all combinations of state and symbol that are not covered by an edge
/// of the happy path. Provisional edges back to the initial state don't count as covered.
pub fn generate(
    patterns: &Patterns,
    states: &States,
    alphabet: &[Symbol],
    happy_path: &[Edge],
) -> Vec<Edge> {
    let covered: HashSet<(StateId, &Symbol)> = happy_path
        .iter()
        .filter(|e| e.end != States::INITIAL)
        .map(|e| (e.start, &e.input))
        .collect();
    let mut edges = Vec::new();
    for (start, _) in states.iter() {
        for symbol in alphabet {
            if !covered.contains(&(start, symbol)) {
                edges.push(fallback(patterns, states, start, symbol));
            }
        }
    }
    edges
}
