//! Human readable dumps of a [Transducer] and of a [Trace].
use std::fmt;

use tabled::{Table, Tabled, settings::Style};

use crate::parser::symbol::{self, LAMBDA, Symbol};

use super::{Trace, Transducer};

fn output(symbols: &[Symbol]) -> String {
    if symbols.is_empty() {
        LAMBDA.to_string()
    } else {
        symbol::join(symbols)
    }
}

fn set<'a>(symbols: impl IntoIterator<Item = &'a Symbol>) -> String {
    let symbols: Vec<String> = symbols.into_iter().map(Symbol::to_string).collect();
    format!("{{{}}}", symbols.join(", "))
}

#[derive(Tabled)]
struct DeltaRow {
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "Insym")]
    input: String,
    #[tabled(rename = "Outsym")]
    output: String,
    #[tabled(rename = "End")]
    end: String,
}

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "Read")]
    input: String,
    #[tabled(rename = "Write")]
    output: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Rewrite")]
    rewrite: String,
}

/// The transition table, one row per state and symbol
pub fn delta_table(transducer: &Transducer) -> String {
    let states = transducer.states();
    let rows = transducer
        .delta()
        .transitions()
        .map(|(start, symbol, transition)| DeltaRow {
            start: states.state(start).to_string(),
            input: transducer.alphabet().symbol(symbol).to_string(),
            output: output(&transition.output),
            end: states.state(transition.end).to_string(),
        });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// The steps of a rewrite, marking the transitions that rewrote something
pub fn trace_table(transducer: &Transducer, trace: &Trace) -> String {
    let states = transducer.states();
    let rows = trace.steps().iter().map(|step| StepRow {
        start: states.state(step.start).to_string(),
        input: step.input.to_string(),
        output: output(&step.output),
        end: states.state(step.end).to_string(),
        rewrite: if step.is_transduction { "*" } else { "" }.to_string(),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

impl fmt::Display for Transducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rules:")?;
        for rule in self.rules().rules() {
            writeln!(f, "    {}", rule)?;
        }
        writeln!(f, "Context type: {}", self.rules().context_type())?;
        writeln!(f, "Σ: {}", set(self.sigma()))?;
        writeln!(f, "Γ: {}", set(self.gamma()))?;
        let states: Vec<String> = self.states().iter().map(|(_, s)| s.to_string()).collect();
        writeln!(f, "Q: {{{}}}", states.join(", "))?;
        writeln!(f, "q0: {}", self.states().state(super::States::INITIAL))?;
        writeln!(f, "v0: {}", output(self.initial_output()))?;
        writeln!(f, "Finals:")?;
        for (state, owed) in self.finals().iter() {
            writeln!(f, "    {} -> {}", self.states().state(state), symbol::join(owed))?;
        }
        writeln!(f, "Delta:")?;
        write!(f, "{}", delta_table(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::parser::RuleSet;

    fn transducer(rules: &[&str], contexts: &[&str]) -> Transducer {
        Transducer::compile(RuleSet::from_rules(rules, contexts).unwrap()).unwrap()
    }

    #[test]
    fn dump_test() {
        let t = transducer(&["a -> b"], &["c _"]);
        let dump = t.to_string();
        assert!(dump.contains("a -> b / c _"));
        assert!(dump.contains("Context type: left"));
        assert!(dump.contains("Σ: {?, a, c}"));
        assert!(dump.contains("q0: <λ>"));
        assert!(dump.contains("v0: λ"));
        assert!(dump.contains("Insym"));
    }

    #[test]
    fn delta_table_test() {
        let t = transducer(&["a -> b"], &["c _"]);
        let table = delta_table(&t);
        // a header plus one row per transition
        let rows = table.lines().filter(|l| l.contains('<')).count();
        assert_eq!(rows, t.delta().len());
    }

    #[test]
    fn trace_table_test() {
        let t = transducer(&["a -> b"], &["c _"]);
        let trace = t.trace("c a").unwrap();
        let table = trace_table(&t, &trace);
        assert!(table.contains("Rewrite"));
        assert_eq!(table.lines().filter(|l| l.contains('*')).count(), 1);
    }

    #[test]
    fn initial_output_test() {
        let t = transducer(&["a -> b"], &[])
            .with_initial_output("x y")
            .unwrap();
        assert!(t.to_string().contains("v0: x y"));
    }
}
