//! A deterministic finite state transducer compiled from a [RuleSet].
//!
//! Compilation runs in stages:
//!
//! 1. the rules are turned into [patterns](pattern) (context + input symbol),
//! 2. the [generators] add the states and edges along each context,
//! 3. the [prefix] generator adds carry states and the fallback edges,
//! 4. all edges are merged into the [Delta] table and the [Finals] are computed.
//!
//! The result is immutable and can be shared between threads for rewriting.
use std::collections::BTreeSet;

use log::{debug, trace};

use crate::parser::{
    RuleError, RuleSet, Symbol, TokenizeError,
    context::interleave,
    symbol::{self, tokenize},
};

pub mod delta;
pub mod display;
mod finals;
mod generators;
pub mod pattern;
mod prefix;
pub mod state;

pub use delta::{Alphabet, Delta, SymbolId, Transition};
pub use finals::Finals;
pub use state::{State, StateId, States};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TransducerError {
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error("No transition from state {state} on {symbol:?}")]
    IncompleteDelta { state: String, symbol: String },
    #[error("Symbol {symbol:?} is not part of the alphabet")]
    UnknownSymbol { symbol: String },
}

/// One step of a rewrite
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub start: StateId,
    /// The symbol as it was read
    pub input: Symbol,
    /// The output with the wildcard resolved
    pub output: Vec<Symbol>,
    pub end: StateId,
    pub is_transduction: bool,
}

/// The steps taken for one input together with the output owed by the last state
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    initial_output: Vec<Symbol>,
    steps: Vec<Step>,
    final_output: Vec<Symbol>,
}

impl Trace {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The state the input ended in
    pub fn final_state(&self) -> StateId {
        self.steps.last().map_or(States::INITIAL, |s| s.end)
    }

    pub fn final_output(&self) -> &[Symbol] {
        &self.final_output
    }

    /// All output including the sentinels
    pub fn tape(&self) -> impl Iterator<Item = &Symbol> {
        self.initial_output
            .iter()
            .chain(self.steps.iter().flat_map(|s| s.output.iter()))
            .chain(self.final_output.iter())
    }

    /// The output without the sentinels
    pub fn output(&self) -> Vec<Symbol> {
        self.tape().filter(|s| !s.is_sentinel()).cloned().collect()
    }
}

#[derive(Debug)]
pub struct Transducer {
    rules: RuleSet,
    states: States,
    alphabet: Alphabet,
    delta: Delta,
    finals: Finals,
    initial_output: Vec<Symbol>,
}

impl Transducer {
    pub fn compile(rules: RuleSet) -> Result<Self, TransducerError> {
        let patterns = pattern::Patterns::compile(&rules);
        let alphabet = Alphabet::new(patterns.symbols());
        debug!(
            "Compiling {} patterns over {} symbols",
            patterns.len(),
            alphabet.len()
        );

        let mut states = States::new(rules.context_type());
        let mut edges = generators::generate(&rules, &patterns, &mut states);
        let generated = states.len();
        prefix::close(&patterns, &mut states, alphabet.symbols());
        debug!(
            "{} context states, {} carry states",
            generated,
            states.len() - generated
        );
        let fallbacks = prefix::generate(&patterns, &states, alphabet.symbols(), &edges);
        debug!(
            "{} happy path edges, {} fallback edges",
            edges.len(),
            fallbacks.len()
        );
        edges.extend(fallbacks);

        let delta = Delta::assemble(edges, &states, &alphabet)?;
        let finals = Finals::compute(&patterns, &states);
        Ok(Self {
            rules,
            states,
            alphabet,
            delta,
            finals,
            initial_output: Vec::new(),
        })
    }

    /// Prepend `prefix` (a space separated list of symbols) to every output
    pub fn with_initial_output(mut self, prefix: &str) -> Result<Self, TransducerError> {
        self.initial_output = tokenize(prefix)?;
        Ok(self)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn states(&self) -> &States {
        &self.states
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn delta(&self) -> &Delta {
        &self.delta
    }

    pub fn finals(&self) -> &Finals {
        &self.finals
    }

    pub fn initial_output(&self) -> &[Symbol] {
        &self.initial_output
    }

    /// The input alphabet Σ, i.e. all symbols read on some transition
    pub fn sigma(&self) -> BTreeSet<&Symbol> {
        self.alphabet.symbols().iter().collect()
    }

    /// The output alphabet Γ, i.e. all symbols written on some transition or as final output
    pub fn gamma(&self) -> BTreeSet<&Symbol> {
        self.delta
            .transitions()
            .flat_map(|(_, _, t)| t.output.iter())
            .chain(self.finals.iter().flat_map(|(_, output)| output.iter()))
            .collect()
    }

    /// Surround the input with boundaries and, for insertions, make room between all
    /// symbols
    fn frame(&self, input: &[Symbol]) -> Vec<Symbol> {
        let mut framed = Vec::with_capacity(input.len() + 2);
        framed.push(Symbol::boundary());
        framed.extend_from_slice(input);
        framed.push(Symbol::boundary());
        if self.rules.is_insertion() {
            interleave(&framed)
        } else {
            framed
        }
    }

    /// Run the transducer on `input` without validating it. A `$` or `Ø` in `input` is read
    /// as the sentinel it stands for.
    pub fn trace_symbols(&self, input: &[Symbol]) -> Trace {
        let mut state = States::INITIAL;
        let mut steps = Vec::new();
        for symbol in self.frame(input) {
            let transition = self.delta.get(state, self.alphabet.lookup(symbol.as_str()));
            let output = transition
                .output
                .iter()
                .map(|o| if o.is_wildcard() { &symbol } else { o })
                .cloned()
                .collect();
            trace!(
                "{} --{}--> {}",
                self.states.state(state),
                symbol,
                self.states.state(transition.end)
            );
            steps.push(Step {
                start: state,
                input: symbol,
                output,
                end: transition.end,
                is_transduction: transition.is_transduction,
            });
            state = transition.end;
        }
        Trace {
            initial_output: self.initial_output.clone(),
            steps,
            final_output: self.finals.get(state).to_vec(),
        }
    }

    /// Run the transducer on a space separated string of symbols. The sentinels and the
    /// context marker are rejected.
    pub fn trace(&self, input: &str) -> Result<Trace, TransducerError> {
        let symbols = tokenize(input)?;
        if let Some(symbol) = symbols.iter().find(|s| s.is_sentinel() || s.is_marker()) {
            return Err(RuleError::ReservedSymbol {
                symbol: symbol.to_string(),
                place: input.to_string(),
            }
            .into());
        }
        Ok(self.trace_symbols(&symbols))
    }

    /// Same as [Transducer::trace_symbols], the input is not validated
    pub fn rewrite_symbols(&self, input: &[Symbol]) -> Vec<Symbol> {
        self.trace_symbols(input).output()
    }

    /// Rewrite a space separated string of symbols
    pub fn rewrite(&self, input: &str) -> Result<String, TransducerError> {
        Ok(symbol::join(&self.trace(input)?.output()))
    }
}
