use std::{path::PathBuf, process};

use clap::{Args, Parser, Subcommand, ValueEnum};
use deltastar::{
    parser::RuleKind,
    test::{RuleDefinition, TestResult, check_yaml},
    transducer::{Transducer, TransducerError, display},
};
use log::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Assimilation,
    Deletion,
    Insertion,
}

impl From<Kind> for RuleKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Assimilation => RuleKind::Assimilation,
            Kind::Deletion => RuleKind::Deletion,
            Kind::Insertion => RuleKind::Insertion,
        }
    }
}

#[derive(Debug, Args)]
struct RuleArgs {
    /// Rewrite rule of the form 'IN -> OUT', leave a side empty for deletion or insertion
    #[arg(short, long = "rule", required = true, allow_hyphen_values = true)]
    rules: Vec<String>,
    /// Context of the form 'LEFT _ RIGHT', shared by all rules
    #[arg(short, long = "context")]
    contexts: Vec<String>,
    /// Require all rules to be of this kind
    #[arg(short, long, value_enum)]
    kind: Option<Kind>,
    /// Symbols to prepend to every output
    #[arg(long)]
    prefix: Option<String>,
}

impl RuleArgs {
    fn compile(&self) -> Result<Transducer, TransducerError> {
        RuleDefinition::new(
            self.rules.clone(),
            self.contexts.clone(),
            self.kind.map(Into::into),
            self.prefix.clone(),
        )
        .compile()
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rewrite <INPUT>, a space separated list of symbols, with the given rules
    #[command(arg_required_else_help = true)]
    Rewrite {
        #[command(flatten)]
        rules: RuleArgs,
        /// Print every step of the rewrite
        #[arg(long)]
        trace: bool,
        /// Symbols to rewrite
        input: String,
    },
    /// Print the parameters of the transducer for the given rules
    #[command(arg_required_else_help = true)]
    Debug {
        #[command(flatten)]
        rules: RuleArgs,
    },
    /// Run the tests defined in the <YAML_TEST_FILE>s. Return 0 if all
    /// tests pass or 1 if any of the tests fail.
    CheckYaml {
        /// YAML files listing the rules and their tests
        #[arg(required = true)]
        yaml: Vec<PathBuf>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "deltastar")]
#[command(about = "Compile contextual rewrite rules into finite state transducers")]
#[command(author, version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn rewrite(rules: &RuleArgs, trace: bool, input: &str) -> Result<(), TransducerError> {
    let transducer = rules.compile()?;
    let run = transducer.trace(input)?;
    if trace {
        println!("{}", display::trace_table(&transducer, &run));
    }
    println!("{}", deltastar::parser::symbol::join(&run.output()));
    Ok(())
}

fn check(paths: &[PathBuf]) -> Result<bool, deltastar::test::TestError> {
    let mut results = Vec::new();
    for path in paths {
        info!("Testing with {:?}", path);
        results.extend(check_yaml(path)?);
    }
    for result in &results {
        match result {
            TestResult::Failure {
                input,
                expected,
                actual,
            } => println!("FAIL {:?}: expected {:?}, got {:?}", input, expected, actual),
            TestResult::UnexpectedSuccess { input } => {
                println!("XPASS {:?}", input)
            }
            _ => (),
        }
    }
    let count = |f: fn(&TestResult) -> bool| results.iter().filter(|r| f(r)).count();
    println!("Pass: {}", count(TestResult::is_success));
    println!("Fail: {}", count(TestResult::is_failure));
    println!("Expected failures: {}", count(TestResult::is_expected_failure));
    println!("Unexpected successes: {}", count(TestResult::is_unexpected_success));
    Ok(count(TestResult::is_failure) == 0)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match args.command {
        Commands::Rewrite {
            rules,
            trace,
            input,
        } => rewrite(&rules, trace, &input).map_err(Into::into),
        Commands::Debug { rules } => rules
            .compile()
            .map(|transducer| println!("{}", transducer))
            .map_err(Into::into),
        Commands::CheckYaml { yaml } => match check(&yaml) {
            Ok(true) => Ok(()),
            Ok(false) => process::exit(1),
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
