use crate::parser::Symbol;

use super::{
    pattern::Patterns,
    state::{StateId, States},
};

/// The output owed by each state when the input ends in it.
///
/// These are the symbols a state holds back, rewritten where a context inside the path of
/// the state is already complete. For a left context nothing is ever held back.
#[derive(Debug, PartialEq)]
pub struct Finals(Vec<Vec<Symbol>>);

impl Finals {
    pub fn compute(patterns: &Patterns, states: &States) -> Self {
        Finals(
            states
                .iter()
                .map(|(_, state)| {
                    let path = state.path();
                    patterns
                        .settle(path, state.consumed_left_len()..path.len())
                        .output
                })
                .collect(),
        )
    }

    pub fn get(&self, state: StateId) -> &[Symbol] {
        &self.0[state]
    }

    /// The states that owe some output
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &[Symbol])> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, output)| !output.is_empty())
            .map(|(state, output)| (state, output.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{parser::RuleSet, transducer::generators};

    fn symbols(source: &str) -> Vec<Symbol> {
        source.split_whitespace().map(Symbol::from).collect()
    }

    fn finals(rules: &[&str], contexts: &[&str]) -> (States, Finals) {
        let rules = RuleSet::from_rules(rules, contexts).unwrap();
        let patterns = Patterns::compile(&rules);
        let mut states = States::new(rules.context_type());
        generators::generate(&rules, &patterns, &mut states);
        let finals = Finals::compute(&patterns, &states);
        (states, finals)
    }

    #[test]
    fn left_test() {
        let (_, finals) = finals(&["a -> b"], &["a c a b _"]);
        assert_eq!(finals.iter().count(), 0);
    }

    #[test]
    fn right_test() {
        let (states, finals) = finals(&["a -> b"], &["_ a b a b"]);
        let aab = states.get(&symbols("a a b")).unwrap();
        // the whole path is flushed
        assert_eq!(finals.get(aab), symbols("a a b"));
        assert!(finals.get(States::INITIAL).is_empty());
    }

    #[test]
    fn dual_test() {
        let (states, finals) = finals(&["a -> X"], &["a c _ c b"]);
        let acac = states.get(&symbols("a c a c")).unwrap();
        // the left context was written already
        assert_eq!(finals.get(acac), symbols("a c"));
        let ac = states.get(&symbols("a c")).unwrap();
        assert!(finals.get(ac).is_empty());
    }
}
