//! Compile contextual rewrite rules such as `a -> b / c _ d` into deterministic finite state
//! transducers and rewrite symbol strings with them in a single left to right pass.
//!
//! ```
//! let t = deltastar::assimilation(&[("a", "X"), ("b", "Y")], &["a c _ c b"]).unwrap();
//! assert_eq!(t.rewrite("a c a c b").unwrap(), "a c X c b");
//! ```
use parser::{Pair, RuleKind, RuleSet};

pub mod parser;
pub mod transducer;
pub mod yaml;

pub use parser::{RuleError, Symbol};
pub use transducer::{Transducer, TransducerError};

fn compile(
    kind: RuleKind,
    pairs: &[(&str, &str)],
    contexts: &[&str],
) -> Result<Transducer, TransducerError> {
    let pairs = pairs
        .iter()
        .map(|(input, output)| Pair::new(input, output))
        .collect::<Result<Vec<_>, _>>()?;
    let rules = RuleSet::new(pairs, contexts)?.restrict(kind)?;
    Transducer::compile(rules)
}

/// A transducer that rewrites one symbol into another
pub fn assimilation(
    pairs: &[(&str, &str)],
    contexts: &[&str],
) -> Result<Transducer, TransducerError> {
    compile(RuleKind::Assimilation, pairs, contexts)
}

/// A transducer that deletes symbols. The output of every pair has to be empty.
pub fn deletion(pairs: &[(&str, &str)], contexts: &[&str]) -> Result<Transducer, TransducerError> {
    compile(RuleKind::Deletion, pairs, contexts)
}

/// A transducer that inserts symbols. The input of every pair has to be empty.
pub fn insertion(pairs: &[(&str, &str)], contexts: &[&str]) -> Result<Transducer, TransducerError> {
    compile(RuleKind::Insertion, pairs, contexts)
}
