//! Parsing and validation of rewrite rules.
//!
//! A rule set is a list of [pairs](Pair) of an input and an output symbol together with a
//! list of [contexts](Context) that apply to all of the pairs. All checks happen here so
//! that the construction of a transducer never sees an invalid rule set.
use std::{collections::HashMap, fmt, str::FromStr};

use log::warn;

pub mod context;
pub mod symbol;

pub use context::{Context, ContextType, ContextTypes};
pub use symbol::{Symbol, TokenizeError, tokenize};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RuleError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error("Context {context:?} must contain exactly one '_', found {found}")]
    MarkerCount { context: String, found: usize },
    #[error("Invalid pair ({input:?}, {output:?})")]
    InvalidPair { input: String, output: String },
    #[error("Expected a single symbol, got {found:?}")]
    SingleSymbolExpected { found: String },
    #[error("Reserved symbol {symbol:?} not allowed in {place:?}")]
    ReservedSymbol { symbol: String, place: String },
    #[error("The boundary '$' can only start or end context {context:?}")]
    MisplacedBoundary { context: String },
    #[error("Context type must be homogeneous, got {found:?}")]
    MixedContextTypes { found: ContextTypes },
    #[error("Insertion rules cannot be combined with other rules")]
    MixedInsertion,
    #[error("{input:?} is rewritten to both {first:?} and {second:?}")]
    Ambiguous {
        input: String,
        first: String,
        second: String,
    },
    #[error("Got {inputs} input symbols but {outputs} output symbols")]
    LengthMismatch { inputs: usize, outputs: usize },
    #[error("Expected a rule of the form 'IN -> OUT', got {rule:?}")]
    MalformedRule { rule: String },
    #[error("Unknown rule kind {kind:?}")]
    UnknownKind { kind: String },
    #[error("At least one rule is needed")]
    NoRules,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Both input and output are symbols
    Assimilation,
    /// The output is empty
    Deletion,
    /// The input is empty
    Insertion,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Assimilation => write!(f, "assimilation"),
            RuleKind::Deletion => write!(f, "deletion"),
            RuleKind::Insertion => write!(f, "insertion"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assimilation" => Ok(RuleKind::Assimilation),
            "deletion" => Ok(RuleKind::Deletion),
            "insertion" => Ok(RuleKind::Insertion),
            _ => Err(RuleError::UnknownKind { kind: s.to_string() }),
        }
    }
}

/// Parse one side of a pair. `None` is the empty side.
fn side(source: &str) -> Result<Option<Symbol>, RuleError> {
    let mut symbols = tokenize(source)?;
    match symbols.len() {
        0 => Ok(None),
        1 => {
            let symbol = symbols.remove(0);
            if symbol.is_empty_marker() {
                Ok(None)
            } else if symbol.is_reserved() {
                Err(RuleError::ReservedSymbol {
                    symbol: symbol.to_string(),
                    place: source.to_string(),
                })
            } else {
                Ok(Some(symbol))
            }
        }
        _ => Err(RuleError::SingleSymbolExpected {
            found: source.to_string(),
        }),
    }
}

/// Byte offsets of all `->` outside of bracketed tags
fn arrows(rule: &str) -> Vec<usize> {
    let mut depth = 0usize;
    rule.char_indices()
        .filter(|&(i, c)| {
            match c {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                _ => (),
            }
            depth == 0 && rule[i..].starts_with("->")
        })
        .map(|(i, _)| i)
        .collect()
}

/// An input symbol and the output symbol it is rewritten to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    input: Option<Symbol>,
    output: Option<Symbol>,
}

impl Pair {
    /// Either side may be empty (the empty string or `Ø`), but not both.
    pub fn new(input: &str, output: &str) -> Result<Self, RuleError> {
        let pair = Self {
            input: side(input)?,
            output: side(output)?,
        };
        if pair.input.is_none() && pair.output.is_none() {
            return Err(RuleError::InvalidPair {
                input: input.to_string(),
                output: output.to_string(),
            });
        }
        Ok(pair)
    }

    pub fn kind(&self) -> RuleKind {
        match (&self.input, &self.output) {
            (None, _) => RuleKind::Insertion,
            (Some(_), None) => RuleKind::Deletion,
            (Some(_), Some(_)) => RuleKind::Assimilation,
        }
    }

    /// The symbol that triggers the rule, [EMPTY](symbol::EMPTY) for an insertion
    pub fn input(&self) -> Symbol {
        self.input.clone().unwrap_or_else(Symbol::empty)
    }

    /// The symbol written by the rule, [EMPTY](symbol::EMPTY) for a deletion
    pub fn output(&self) -> Symbol {
        self.output.clone().unwrap_or_else(Symbol::empty)
    }
}

impl FromStr for Pair {
    type Err = RuleError;

    /// Parse a rule of the form `IN -> OUT`. Leave a side blank for insertion or deletion.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match arrows(s).as_slice() {
            &[i] => Pair::new(&s[..i], &s[i + "->".len()..]),
            _ => Err(RuleError::MalformedRule {
                rule: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input(), self.output())
    }
}

/// A validated set of rules that can be compiled into one transducer
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pairs: Vec<Pair>,
    contexts: Vec<Context>,
    context_type: ContextType,
    insertion: bool,
}

impl RuleSet {
    pub fn new<S: AsRef<str>>(pairs: Vec<Pair>, contexts: &[S]) -> Result<Self, RuleError> {
        let mut parsed: Vec<Context> = Vec::new();
        for source in contexts {
            let context = Context::parse(source.as_ref())?;
            if parsed.contains(&context) {
                warn!("Ignoring duplicate context {:?}", source.as_ref());
            } else {
                parsed.push(context);
            }
        }

        let types: ContextTypes = parsed.iter().map(Context::context_type).collect();
        let context_type = match types.len() {
            0 => ContextType::Free,
            1 => types.iter().next().unwrap_or(ContextType::Free),
            _ => return Err(RuleError::MixedContextTypes { found: types }),
        };
        if context_type == ContextType::Free {
            // `_` is the same as no context at all
            parsed.clear();
        }

        let insertions = pairs
            .iter()
            .filter(|p| p.kind() == RuleKind::Insertion)
            .count();
        if insertions > 0 && insertions < pairs.len() {
            return Err(RuleError::MixedInsertion);
        }

        let mut unique: Vec<Pair> = Vec::new();
        let mut outputs: HashMap<Symbol, Symbol> = HashMap::new();
        for pair in pairs {
            match outputs.get(&pair.input()) {
                Some(output) if *output == pair.output() => {
                    warn!("Ignoring duplicate rule {}", pair);
                }
                Some(output) => {
                    return Err(RuleError::Ambiguous {
                        input: pair.input().to_string(),
                        first: output.to_string(),
                        second: pair.output().to_string(),
                    });
                }
                None => {
                    outputs.insert(pair.input(), pair.output());
                    unique.push(pair);
                }
            }
        }
        if unique.is_empty() {
            return Err(RuleError::NoRules);
        }

        Ok(Self {
            pairs: unique,
            contexts: parsed,
            context_type,
            insertion: insertions > 0,
        })
    }

    /// Build a rule set from parallel lists of input and output symbols
    pub fn from_lists<S: AsRef<str>>(
        inputs: &[S],
        outputs: &[S],
        contexts: &[S],
    ) -> Result<Self, RuleError> {
        if inputs.len() != outputs.len() {
            return Err(RuleError::LengthMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        let pairs = inputs
            .iter()
            .zip(outputs)
            .map(|(i, o)| Pair::new(i.as_ref(), o.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(pairs, contexts)
    }

    /// Build a rule set from rules of the form `IN -> OUT`
    pub fn from_rules<S: AsRef<str>>(rules: &[S], contexts: &[S]) -> Result<Self, RuleError> {
        let pairs = rules
            .iter()
            .map(|r| r.as_ref().parse())
            .collect::<Result<Vec<Pair>, _>>()?;
        Self::new(pairs, contexts)
    }

    /// Make sure that every pair is of the given kind
    pub fn restrict(self, kind: RuleKind) -> Result<Self, RuleError> {
        match self.pairs.iter().find(|p| p.kind() != kind) {
            Some(pair) => Err(RuleError::InvalidPair {
                input: pair.input().to_string(),
                output: pair.output().to_string(),
            }),
            None => Ok(self),
        }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// The contexts as they are matched against the (framed) input
    pub fn matching_contexts(&self) -> Vec<Context> {
        if self.insertion {
            self.contexts.iter().map(Context::interleaved).collect()
        } else {
            self.contexts.clone()
        }
    }

    pub fn context_type(&self) -> ContextType {
        self.context_type
    }

    pub fn is_insertion(&self) -> bool {
        self.insertion
    }

    /// Human readable rules of the form `IN -> OUT / CONTEXT`
    pub fn rules(&self) -> Vec<String> {
        let free = [Context::free()];
        let contexts = if self.contexts.is_empty() {
            &free[..]
        } else {
            &self.contexts[..]
        };
        contexts
            .iter()
            .flat_map(|c| self.pairs.iter().map(move |p| format!("{} / {}", p, c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    fn pairs(rules: &[&str]) -> Vec<Pair> {
        rules.iter().map(|r| r.parse().unwrap()).collect()
    }

    #[test]
    fn pair_test() {
        let pair: Pair = "a -> b".parse().unwrap();
        assert_eq!(pair.input(), Symbol::from("a"));
        assert_eq!(pair.output(), Symbol::from("b"));
        assert_eq!(pair.kind(), RuleKind::Assimilation);
        assert_eq!(pair.to_string(), "a -> b");
    }

    #[test]
    fn pair_kinds_test() {
        assert_eq!(Pair::new("a", "").unwrap().kind(), RuleKind::Deletion);
        assert_eq!(Pair::new("a", "Ø").unwrap().kind(), RuleKind::Deletion);
        assert_eq!(Pair::new("", "a").unwrap().kind(), RuleKind::Insertion);
        assert_eq!("-> a".parse::<Pair>().unwrap().kind(), RuleKind::Insertion);
        assert_eq!("a ->".parse::<Pair>().unwrap().to_string(), "a -> Ø");
        assert_eq!(
            Pair::new("", "Ø"),
            Err(RuleError::InvalidPair {
                input: "".into(),
                output: "Ø".into()
            })
        );
    }

    #[test]
    fn pair_errors_test() {
        assert_eq!(
            "a b".parse::<Pair>(),
            Err(RuleError::MalformedRule { rule: "a b".into() })
        );
        assert!("a -> b -> c".parse::<Pair>().is_err());
        assert_eq!(
            Pair::new("a b", "c"),
            Err(RuleError::SingleSymbolExpected {
                found: "a b".into()
            })
        );
        assert_eq!(
            Pair::new("?", "c"),
            Err(RuleError::ReservedSymbol {
                symbol: "?".into(),
                place: "?".into()
            })
        );
        assert!(Pair::new("$", "c").is_err());
        assert!(Pair::new("a", "_").is_err());
        assert!(Pair::new("[tns=pst]", "[tns=prs]").is_ok());
    }

    #[test]
    fn arrow_in_tag_test() {
        let pair: Pair = "[x->y] -> [y->x]".parse().unwrap();
        assert_eq!(pair.input(), Symbol::from("[x->y]"));
        assert_eq!(pair.output(), Symbol::from("[y->x]"));
        let pair: Pair = "a->[b]".parse().unwrap();
        assert_eq!(pair.output(), Symbol::from("[b]"));
        assert_eq!(
            "[a->b]".parse::<Pair>(),
            Err(RuleError::MalformedRule {
                rule: "[a->b]".into()
            })
        );
    }

    #[test]
    fn homogeneous_test() {
        let rules = RuleSet::new(pairs(&["a -> b"]), &["x _", "y z _"]).unwrap();
        assert_eq!(rules.context_type(), ContextType::Left);
        assert_eq!(
            RuleSet::new(pairs(&["a -> b"]), &["x _", "_ y"]),
            Err(RuleError::MixedContextTypes {
                found: ContextType::Left | ContextType::Right
            })
        );
        assert!(RuleSet::new(pairs(&["a -> b"]), &["x _ y", "_"]).is_err());
    }

    #[test]
    fn free_test() {
        let rules = RuleSet::new(pairs(&["a -> b"]), &NONE).unwrap();
        assert_eq!(rules.context_type(), ContextType::Free);
        let rules = RuleSet::new(pairs(&["a -> b"]), &["_"]).unwrap();
        assert_eq!(rules.context_type(), ContextType::Free);
        assert!(rules.contexts().is_empty());
    }

    #[test]
    fn insertion_test() {
        let rules = RuleSet::new(pairs(&["-> x"]), &["a b _"]).unwrap();
        assert!(rules.is_insertion());
        assert_eq!(rules.matching_contexts()[0].left().len(), 3);
        assert_eq!(
            RuleSet::new(pairs(&["-> x", "a -> b"]), &["a _"]),
            Err(RuleError::MixedInsertion)
        );
        // deletion and assimilation can share a rule set
        assert!(RuleSet::new(pairs(&["a ->", "b -> c"]), &["a _"]).is_ok());
    }

    #[test]
    fn ambiguity_test() {
        assert_eq!(
            RuleSet::new(pairs(&["a -> b", "a -> c"]), &NONE),
            Err(RuleError::Ambiguous {
                input: "a".into(),
                first: "b".into(),
                second: "c".into()
            })
        );
        let rules = RuleSet::new(pairs(&["a -> b", "a -> b"]), &["x _", "x _"]).unwrap();
        assert_eq!(rules.pairs().len(), 1);
        assert_eq!(rules.contexts().len(), 1);
    }

    #[test]
    fn lists_test() {
        let rules = RuleSet::from_lists(&["a", "b"], &["x", "y"], &["c _"]).unwrap();
        assert_eq!(rules.pairs().len(), 2);
        assert_eq!(
            RuleSet::from_lists(&["a", "b"], &["x"], &["c _"]),
            Err(RuleError::LengthMismatch {
                inputs: 2,
                outputs: 1
            })
        );
    }

    #[test]
    fn restrict_test() {
        let rules = RuleSet::from_rules(&["a ->", "b -> c"], &["x _"]).unwrap();
        assert_eq!(
            rules.clone().restrict(RuleKind::Deletion),
            Err(RuleError::InvalidPair {
                input: "b".into(),
                output: "c".into()
            })
        );
        assert!(rules.restrict(RuleKind::Assimilation).is_err());
        let rules = RuleSet::from_rules(&["a ->"], &["x _"]).unwrap();
        assert!(rules.restrict(RuleKind::Deletion).is_ok());
    }

    #[test]
    fn rules_test() {
        let rules = RuleSet::from_rules(&["a -> X", "b -> Y"], &["a c _ c b"]).unwrap();
        assert_eq!(
            rules.rules(),
            vec!["a -> X / a c _ c b", "b -> Y / a c _ c b"]
        );
        let rules = RuleSet::from_rules(&["a ->"], &[]).unwrap();
        assert_eq!(rules.rules(), vec!["a -> Ø / _"]);
    }

    #[test]
    fn no_rules_test() {
        assert_eq!(RuleSet::new(vec![], &["a _"]), Err(RuleError::NoRules));
    }

    #[test]
    fn kind_from_str_test() {
        assert_eq!("deletion".parse(), Ok(RuleKind::Deletion));
        assert!("merge".parse::<RuleKind>().is_err());
    }
}
