//! The alphabet and the transition table of a transducer.
use std::collections::{HashMap, hash_map::Entry};

use crate::parser::Symbol;

use super::{
    TransducerError,
    state::{Edge, StateId, States},
};

/// Reference to a symbol in the [Alphabet]
pub type SymbolId = usize;

/// All symbols a transducer knows about, including the wildcard. Any other symbol is read
/// as the wildcard.
#[derive(Debug)]
pub struct Alphabet {
    symbols: Vec<Symbol>,
    index: HashMap<Symbol, SymbolId>,
    wildcard: SymbolId,
}

impl Alphabet {
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut symbols: Vec<Symbol> = symbols.into_iter().collect();
        symbols.push(Symbol::wildcard());
        symbols.sort();
        symbols.dedup();
        let index: HashMap<Symbol, SymbolId> = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let wildcard = index[&Symbol::wildcard()];
        Self {
            symbols,
            index,
            wildcard,
        }
    }

    pub fn get(&self, symbol: &str) -> Option<SymbolId> {
        self.index.get(symbol).copied()
    }

    /// The id of `symbol`, the wildcard if it isn't part of the alphabet
    pub fn lookup(&self, symbol: &str) -> SymbolId {
        self.get(symbol).unwrap_or(self.wildcard)
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// What happens when a symbol is read in a state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub output: Vec<Symbol>,
    pub end: StateId,
    pub is_transduction: bool,
}

/// The transition table, one row per state with one transition per alphabet symbol
#[derive(Debug, PartialEq)]
pub struct Delta {
    rows: Vec<Vec<Transition>>,
}

/// Which of two edges for the same state and symbol is kept.
///
/// The more specific destination (the longer path) wins, then a transduction over a plain
/// edge. The rest only makes the choice independent of the order of the edges.
fn precedence<'a>(
    edge: &'a Edge,
    states: &'a States,
) -> (usize, bool, &'a [Symbol], &'a [Symbol]) {
    let end = states.state(edge.end).path();
    (end.len(), edge.is_transduction, end, edge.output.as_slice())
}

impl Delta {
    pub fn assemble(
        edges: impl IntoIterator<Item = Edge>,
        states: &States,
        alphabet: &Alphabet,
    ) -> Result<Self, TransducerError> {
        let mut table: HashMap<(StateId, SymbolId), Edge> = HashMap::new();
        for edge in edges {
            let symbol = alphabet
                .get(edge.input.as_str())
                .ok_or_else(|| TransducerError::UnknownSymbol {
                    symbol: edge.input.to_string(),
                })?;
            match table.entry((edge.start, symbol)) {
                Entry::Vacant(entry) => {
                    entry.insert(edge);
                }
                Entry::Occupied(mut entry) => {
                    if precedence(&edge, states) > precedence(entry.get(), states) {
                        entry.insert(edge);
                    }
                }
            }
        }

        let mut rows = Vec::with_capacity(states.len());
        for (state, _) in states.iter() {
            let mut row = Vec::with_capacity(alphabet.len());
            for symbol in 0..alphabet.len() {
                let edge = table.remove(&(state, symbol)).ok_or_else(|| {
                    TransducerError::IncompleteDelta {
                        state: states.state(state).to_string(),
                        symbol: alphabet.symbol(symbol).to_string(),
                    }
                })?;
                row.push(Transition {
                    output: edge.output,
                    end: edge.end,
                    is_transduction: edge.is_transduction,
                });
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn get(&self, state: StateId, symbol: SymbolId) -> &Transition {
        &self.rows[state][symbol]
    }

    /// All transitions, ordered by state and symbol
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, &Transition)> {
        self.rows.iter().enumerate().flat_map(|(state, row)| {
            row.iter()
                .enumerate()
                .map(move |(symbol, transition)| (state, symbol, transition))
        })
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::{
        parser::RuleSet,
        transducer::{generators, pattern::Patterns, prefix},
    };

    fn symbols(source: &str) -> Vec<Symbol> {
        source.split_whitespace().map(Symbol::from).collect()
    }

    /// All edges for a rule set, before assembly
    fn edges<S: AsRef<str>>(rules: &[S], contexts: &[S]) -> (States, Alphabet, Vec<Edge>) {
        let rules = RuleSet::from_rules(rules, contexts).unwrap();
        let patterns = Patterns::compile(&rules);
        let alphabet = Alphabet::new(patterns.symbols());
        let mut states = States::new(rules.context_type());
        let mut edges = generators::generate(&rules, &patterns, &mut states);
        prefix::close(&patterns, &mut states, alphabet.symbols());
        let fallbacks = prefix::generate(&patterns, &states, alphabet.symbols(), &edges);
        edges.extend(fallbacks);
        (states, alphabet, edges)
    }

    #[test]
    fn alphabet_test() {
        let alphabet = Alphabet::new(symbols("b a c a"));
        assert_eq!(alphabet.symbols(), symbols("? a b c"));
        assert_eq!(alphabet.lookup("a"), 1);
        assert_eq!(alphabet.lookup("z"), alphabet.lookup("?"));
        assert_eq!(alphabet.get("z"), None);
    }

    #[test]
    fn totality_test() {
        let (states, alphabet, edges) = edges(&["a -> X", "b -> Y"], &["a c _ c b"]);
        let delta = Delta::assemble(edges, &states, &alphabet).unwrap();
        assert_eq!(delta.len(), states.len() * alphabet.len());
        assert_eq!(delta.transitions().count(), delta.len());
    }

    #[test]
    fn transduction_wins_test() {
        let (states, alphabet, mut edges) = edges(&["a -> b"], &["c _"]);
        let c = states.get(&symbols("c")).unwrap();
        // a placeholder back to the initial state for the same key doesn't replace the
        // transduction
        edges.push(Edge {
            start: c,
            input: "a".into(),
            output: symbols("a"),
            end: States::INITIAL,
            is_transduction: false,
        });
        let delta = Delta::assemble(edges, &states, &alphabet).unwrap();
        let transition = delta.get(c, alphabet.lookup("a"));
        assert_eq!(transition.output, symbols("b"));
        assert!(transition.is_transduction);
    }

    #[test]
    fn incomplete_test() {
        let (states, alphabet, mut edges) = edges(&["a -> b"], &["c _"]);
        edges.retain(|e| !(e.start == States::INITIAL && e.input.as_str() == "c"));
        assert_eq!(
            Delta::assemble(edges, &states, &alphabet),
            Err(TransducerError::IncompleteDelta {
                state: "<λ>".into(),
                symbol: "c".into()
            })
        );
    }

    #[test]
    fn unknown_symbol_test() {
        let (states, alphabet, mut edges) = edges(&["a -> b"], &["c _"]);
        edges.push(Edge {
            start: States::INITIAL,
            input: "z".into(),
            output: symbols("z"),
            end: States::INITIAL,
            is_transduction: false,
        });
        assert_eq!(
            Delta::assemble(edges, &states, &alphabet),
            Err(TransducerError::UnknownSymbol { symbol: "z".into() })
        );
    }

    /// Rules and contexts of a random kind, all contexts of the same shape
    fn rule_set() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
        let side = prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..=3)
            .prop_map(|s| s.join(" "));
        (
            prop::sample::select(vec!["_", "{l} _", "_ {r}", "{l} _ {r}"]),
            prop::sample::select(vec!["assimilation", "deletion", "insertion"]),
            prop::sample::subsequence(vec!["a", "b", "c"], 1..=3),
            prop::collection::vec(prop::sample::select(vec!["X", "Y", "a", "b", "c"]), 3),
            prop::collection::vec((side.clone(), side, any::<bool>()), 1..=3),
        )
            .prop_map(|(shape, kind, inputs, outputs, sides)| {
                let rules = match kind {
                    "insertion" => vec!["-> Q".to_string()],
                    "deletion" => inputs.iter().map(|i| format!("{} ->", i)).collect(),
                    _ => inputs
                        .iter()
                        .zip(&outputs)
                        .map(|(i, o)| format!("{} -> {}", i, o))
                        .collect(),
                };
                let contexts = sides
                    .into_iter()
                    .map(|(left, right, boundary)| {
                        let (left, right) = if boundary {
                            (format!("$ {}", left), format!("{} $", right))
                        } else {
                            (left, right)
                        };
                        shape.replace("{l}", &left).replace("{r}", &right)
                    })
                    .collect();
                (rules, contexts)
            })
    }

    type Shuffled = (Vec<String>, Vec<String>, Vec<Edge>, Vec<Edge>);

    fn shuffled_edges() -> impl Strategy<Value = Shuffled> {
        rule_set().prop_flat_map(|(rules, contexts)| {
            let (_, _, edges) = edges(&rules, &contexts);
            (
                Just(rules),
                Just(contexts),
                Just(edges.clone()),
                Just(edges).prop_shuffle(),
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn order_independence((rules, contexts, edges_in_order, shuffled) in shuffled_edges()) {
            let (states, alphabet, _) = edges(&rules, &contexts);
            let expected = Delta::assemble(edges_in_order, &states, &alphabet).unwrap();
            let delta = Delta::assemble(shuffled, &states, &alphabet).unwrap();
            prop_assert_eq!(delta, expected);
        }
    }
}
