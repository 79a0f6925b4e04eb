use std::{collections::HashMap, fmt};

use crate::parser::{ContextType, Symbol, symbol};

use super::pattern::Patterns;

/// Reference to a state in the [States] vector
pub type StateId = usize;

/// A state of the transducer.
///
/// A state is identified by its path, the symbols read since the last position at which
/// no partial match was pending. The first `consumed_left_len` symbols of the path have
/// already been written out, the rest are held back until it is known whether they are
/// rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    path: Vec<Symbol>,
    context_type: ContextType,
    consumed_left_len: usize,
}

impl State {
    pub fn path(&self) -> &[Symbol] {
        &self.path
    }

    pub fn context_type(&self) -> ContextType {
        self.context_type
    }

    pub fn consumed_left_len(&self) -> usize {
        self.consumed_left_len
    }

    /// The symbols that have been read but not written yet
    pub fn pending(&self) -> &[Symbol] {
        &self.path[self.consumed_left_len..]
    }

    pub fn is_initial(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<{}>", symbol::LAMBDA)
        } else {
            write!(f, "<{}>", symbol::join(&self.path))
        }
    }
}

/// The set of states of a transducer, indexed by their path
#[derive(Debug)]
pub struct States {
    states: Vec<State>,
    index: HashMap<Vec<Symbol>, StateId>,
    context_type: ContextType,
}

impl States {
    pub const INITIAL: StateId = 0;

    /// A state set that contains just the initial state
    pub fn new(context_type: ContextType) -> Self {
        let mut states = Self {
            states: Vec::new(),
            index: HashMap::new(),
            context_type,
        };
        states.add_state(Vec::new(), 0);
        states
    }

    fn add_state(&mut self, path: Vec<Symbol>, consumed_left_len: usize) -> StateId {
        let id = self.states.len();
        self.index.insert(path.clone(), id);
        self.states.push(State {
            path,
            context_type: self.context_type,
            consumed_left_len,
        });
        id
    }

    /// The state for `path`, added if it doesn't exist yet
    pub fn intern(&mut self, path: &[Symbol], patterns: &Patterns) -> StateId {
        match self.index.get(path) {
            Some(&id) => id,
            None => self.add_state(path.to_vec(), patterns.consumed_left_len(path)),
        }
    }

    pub fn get(&self, path: &[Symbol]) -> Option<StateId> {
        self.index.get(path).copied()
    }

    /// The state whose path is the longest suffix of `window`. As the initial state has the
    /// empty path there always is one.
    pub fn longest_suffix(&self, window: &[Symbol]) -> StateId {
        (0..=window.len())
            .find_map(|start| self.get(&window[start..]))
            .unwrap_or(Self::INITIAL)
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn context_type(&self) -> ContextType {
        self.context_type
    }
}

/// An edge between two states, as produced by the generators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub start: StateId,
    pub input: Symbol,
    pub output: Vec<Symbol>,
    pub end: StateId,
    /// Does this edge write a rewritten symbol?
    pub is_transduction: bool,
}
